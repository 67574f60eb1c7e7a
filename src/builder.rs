//! Document construction helpers: paper size, margins, footer and page tracking.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style;
use genpdf::{self, Element, Margins, Mm, PageDecorator, Position, Size};

use crate::elements::mm_from_f64;
use crate::theme::PageGeometry;

/// A section heading and the page it was placed on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionMark {
    pub title: String,
    pub page: usize,
}

#[derive(Debug, Default)]
struct TrackerState {
    page: Cell<usize>,
    marks: RefCell<Vec<SectionMark>>,
}

/// Shared page counter written by the page decorator and read by page anchors.
#[derive(Clone, Debug, Default)]
pub struct PageTracker {
    state: Rc<TrackerState>,
}

impl PageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-based number of the page being laid out; zero before the first page.
    pub fn current_page(&self) -> usize {
        self.state.page.get()
    }

    fn begin_page(&self) -> usize {
        let page = self.state.page.get() + 1;
        self.state.page.set(page);
        page
    }

    /// Records that `title` starts on the current page.
    pub fn mark(&self, title: impl Into<String>) {
        self.state.marks.borrow_mut().push(SectionMark {
            title: title.into(),
            page: self.current_page(),
        });
    }

    /// The recorded section marks, in document order.
    pub fn marks(&self) -> Vec<SectionMark> {
        self.state.marks.borrow().clone()
    }
}

type FooterFactory = dyn Fn(usize) -> Box<dyn Element>;

/// Builder for `genpdf::Document` instances.
#[derive(Default)]
pub struct DocumentBuilder {
    title: Option<String>,
    paper_size: Option<Size>,
    margins: Option<Margins>,
    font_size: Option<u8>,
    footer: Option<FooterSpec>,
    tracker: Option<PageTracker>,
}

impl DocumentBuilder {
    /// Creates a new builder instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Paper size and margins taken from a page geometry.
    pub fn for_page(page: &PageGeometry) -> Self {
        Self::new()
            .with_paper_size(Size::new(
                mm_from_f64(page.width_mm),
                mm_from_f64(page.height_mm),
            ))
            .with_margins(Margins::trbl(
                mm_from_f64(page.margin_top_mm),
                mm_from_f64(page.margin_right_mm),
                mm_from_f64(page.margin_bottom_mm),
                mm_from_f64(page.margin_left_mm),
            ))
    }

    /// Sets the document title stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the paper size used for newly created documents.
    pub fn with_paper_size(mut self, paper_size: impl Into<Size>) -> Self {
        self.paper_size = Some(paper_size.into());
        self
    }

    /// Sets the margins applied through the page decorator.
    pub fn with_margins(mut self, margins: impl Into<Margins>) -> Self {
        self.margins = Some(margins.into());
        self
    }

    /// Sets the default font size of the document.
    pub fn with_font_size(mut self, font_size: u8) -> Self {
        self.font_size = Some(font_size);
        self
    }

    /// Configures a footer callback with a fixed height that is invoked for every page.
    pub fn with_footer<F, E>(mut self, height: impl Into<Mm>, footer: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        self.footer = Some(FooterSpec::new(height, footer));
        self
    }

    /// Counts pages into `tracker` while the document renders.
    pub fn with_page_tracker(mut self, tracker: PageTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Builds a fully configured `genpdf::Document` instance.
    pub fn build(self, font_family: FontFamily<FontData>) -> genpdf::Document {
        let mut document = genpdf::Document::new(font_family);

        if let Some(title) = self.title {
            document.set_title(title);
        }

        if let Some(paper_size) = self.paper_size {
            document.set_paper_size(paper_size);
        }

        if let Some(font_size) = self.font_size {
            document.set_font_size(font_size);
        }

        let decorator = ConfiguredPageDecorator {
            tracker: self.tracker.unwrap_or_default(),
            margins: self.margins,
            footer: self.footer,
        };
        document.set_page_decorator(decorator);

        document
    }
}

/// Definition of a footer rendered through the page decorator.
pub struct FooterSpec {
    height: Mm,
    factory: Box<FooterFactory>,
}

impl FooterSpec {
    /// Creates a new footer specification.
    pub fn new<F, E>(height: impl Into<Mm>, factory: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        Self {
            height: height.into(),
            factory: Box::new(move |page| Box::new(factory(page)) as Box<dyn Element>),
        }
    }
}

struct ConfiguredPageDecorator {
    tracker: PageTracker,
    margins: Option<Margins>,
    footer: Option<FooterSpec>,
}

impl PageDecorator for ConfiguredPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        let page = self.tracker.begin_page();

        if let Some(margins) = self.margins {
            area.add_margins(margins);
        }

        if let Some(footer) = &self.footer {
            let available = area.size().height;
            if footer.height > available {
                return Err(Error::new(
                    "Footer height exceeds available space",
                    ErrorKind::InvalidData,
                ));
            }

            let mut footer_area = area.clone();
            footer_area.add_offset(Position::new(0, available - footer.height));
            let mut element = (footer.factory)(page);
            let result = element.render(context, footer_area, style)?;
            if result.has_more {
                return Err(Error::new(
                    "Footer element does not fit into the reserved space",
                    ErrorKind::PageSizeExceeded,
                ));
            }

            area.set_height(available - footer.height);
        }

        Ok(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_counts_pages_and_marks() {
        let tracker = PageTracker::new();
        assert_eq!(tracker.current_page(), 0);

        let shared = tracker.clone();
        shared.begin_page();
        tracker.mark("Project Definition");
        shared.begin_page();
        shared.begin_page();
        tracker.mark("User Flow");

        assert_eq!(tracker.current_page(), 3);
        assert_eq!(
            tracker.marks(),
            vec![
                SectionMark {
                    title: "Project Definition".into(),
                    page: 1
                },
                SectionMark {
                    title: "User Flow".into(),
                    page: 3
                },
            ]
        );
    }
}
