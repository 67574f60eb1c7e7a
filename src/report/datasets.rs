//! Chart datasets and print sizes for the Let's Watch report.

use chrono::NaiveDate;

use crate::charts::{
    BarOptions, ChartSize, ChartSpec, DiagramBox, DiagramLink, DiagramSpec, FlowSpec, FlowStep,
    GanttOwner, GanttSpec, GanttTask, PieOptions, TrendOptions,
};
use crate::error::{ReportError, Result};
use crate::theme::Rgb;

pub const FLOW_SIZE: ChartSize = ChartSize::new(150.0, 65.0);
pub const MARKET_SIZE: ChartSize = ChartSize::new(130.0, 65.0);
pub const REVENUE_SIZE: ChartSize = ChartSize::new(120.0, 65.0);
pub const TECH_SIZE: ChartSize = ChartSize::new(120.0, 65.0);
pub const ARCHITECTURE_SIZE: ChartSize = ChartSize::new(155.0, 105.0);
pub const GANTT_SIZE: ChartSize = ChartSize::new(155.0, 145.0);
pub const POST_LAUNCH_SIZE: ChartSize = ChartSize::new(130.0, 65.0);

const TALHA: Rgb = Rgb::from_u32(0xFF8E53);
const EGE: Rgb = Rgb::from_u32(0x4285F4);
const DENIZ: Rgb = Rgb::from_u32(0x28A745);

fn colors(hex: &[u32]) -> Vec<Rgb> {
    hex.iter().copied().map(Rgb::from_u32).collect()
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        ReportError::data(format!("invalid calendar date {year}-{month:02}-{day:02}"))
    })
}

pub fn tech_stack() -> (ChartSpec, PieOptions) {
    let spec = ChartSpec::new(
        "Technology Split",
        [
            "React /\nReact Native",
            "Electron",
            "PeerJS\nWebRTC",
            "Next.js\nVite",
            "Gemini AI",
            "Website\nDB+API",
        ],
        vec![28.0, 20.0, 22.0, 10.0, 10.0, 10.0],
        colors(&[0x61DAFB, 0x47848F, 0xFF8E53, 0x646CFF, 0x4285F4, 0xE94560]),
    );
    (spec, PieOptions::default())
}

pub fn market() -> (ChartSpec, BarOptions) {
    let spec = ChartSpec::new(
        "Competitor User Base",
        ["Teleparty", "Rave", "Kosmi", "Scener", "Let's Watch\n(target)"],
        vec![10.0, 5.0, 0.5, 2.0, 0.1],
        colors(&[0xE63946, 0xFF6F00, 0x00B4D8, 0x9B59B6, 0xFF8E53]),
    );
    let options = BarOptions::default()
        .with_axis_label("Estimated users (millions)")
        .with_x_max(14.0)
        .with_value_suffix("M");
    (spec, options)
}

pub fn revenue() -> (ChartSpec, PieOptions) {
    let spec = ChartSpec::new(
        "Target Revenue Split (Month 12)",
        [
            "Room + Application\nBoost",
            "Premium\nSubscription",
            "Ads\n(Rewarded)",
            "Theme\nMarket",
        ],
        vec![35.0, 30.0, 25.0, 10.0],
        colors(&[0xFF8E53, 0x4285F4, 0x9B59B6, 0x28A745]),
    );
    (spec, PieOptions::default().with_explode(vec![0.04, 0.04, 0.0, 0.0]))
}

pub fn post_launch() -> (ChartSpec, TrendOptions) {
    let spec = ChartSpec::new(
        "Target Users (March to August 2026)",
        ["March", "April", "May", "June", "July", "August"],
        vec![100.0, 500.0, 2000.0, 5000.0, 12000.0, 25000.0],
        vec![TALHA],
    );
    (spec, TrendOptions::default().with_axis_label("Users"))
}

pub fn user_flow() -> FlowSpec {
    let steps = [
        ("Sign up\n+ Profile", 0x4285F4),
        ("Discover\n+ Filter", 0xFF8E53),
        ("Apply /\nOpen Room", 0xE94560),
        ("Accept\n+ Open DM", 0x28A745),
        ("DM\nIntro", 0x9B59B6),
        ("Watch\n& Date", 0xFF8E53),
    ];
    FlowSpec {
        title: "User Flow".into(),
        steps: steps
            .iter()
            .map(|(label, color)| FlowStep::new(*label, Rgb::from_u32(*color)))
            .collect(),
    }
}

pub fn architecture() -> DiagramSpec {
    let boxes = [
        (0.2, 6.5, 2.8, "Electron Desktop\n(Win / Linux)", 0x47848F),
        (3.4, 6.5, 3.2, "React Native Mobile\n(iOS / Android)", 0x61DAFB),
        (7.0, 6.5, 2.8, "Chrome Extension\n(Side Panel)", 0x4285F4),
        (0.2, 4.8, 4.3, "PeerJS / WebRTC\n(P2P: Video + Chat + DM + Match)", 0xFF8E53),
        (5.0, 4.8, 4.8, "Website DB + API\n(Users, Analytics, Payments, Ads, Index)", 0xE94560),
        (0.2, 3.1, 2.5, "PeerJS Cloud\n(Signaling)", 0x6C757D),
        (3.0, 3.1, 2.5, "Coturn TURN\n(NAT Traversal)", 0xFFC107),
        (5.8, 3.1, 1.8, "Gemini AI\n(Advisor)", 0x28A745),
        (0.2, 1.4, 2.5, "AdMob\n(Ads)", 0x9B59B6),
        (3.0, 1.4, 2.5, "Iyzico + Stripe\n(Payments)", 0x0D6EFD),
        (5.8, 1.4, 1.8, "Nodemailer\n(Email)", 0x333333),
        (7.9, 3.1, 1.9, "Push API\n(Notifications)", 0x0D6EFD),
        (7.9, 1.4, 1.9, "GitHub\n(CI/CD)", 0x333333),
    ];
    let links = [
        ((1.6, 6.5), (2.3, 5.8)),
        ((5.0, 6.5), (4.3, 5.8)),
        ((8.4, 6.5), (7.4, 5.8)),
        ((4.5, 5.3), (5.0, 5.3)),
        ((1.4, 4.8), (1.4, 4.1)),
        ((4.2, 4.8), (4.2, 4.1)),
        ((6.7, 4.8), (6.7, 4.1)),
        ((1.4, 3.1), (1.4, 2.4)),
        ((4.2, 3.1), (4.2, 2.4)),
        ((6.7, 3.1), (6.7, 2.4)),
        ((8.8, 3.1), (8.8, 2.4)),
    ];

    DiagramSpec {
        title: "System Architecture".into(),
        extent: (10.0, 8.0),
        boxes: boxes
            .iter()
            .map(|(x, y, width, label, color)| {
                DiagramBox::new(*x, *y, *width, 1.0, *label, Rgb::from_u32(*color))
            })
            .collect(),
        links: links
            .iter()
            .map(|(from, to)| DiagramLink::new(*from, *to))
            .collect(),
    }
}

/// Nine three-day sprints, one task per person per sprint.
const SPRINT_TASKS: [[&str; 3]; 9] = [
    ["PeerJS Signal + P2P Room", "Website + DB Schema + Deploy", "Chrome Ext MVP"],
    ["STUN/TURN + NAT Test", "Onboarding + Profile UI", "AI Advisor Engine"],
    ["Match API + Room CRUD", "Discover/Search UI", "P2P DM System"],
    ["Payments: Iyzico + Stripe", "DM Chat UI + Alerts", "Mood Theme + Reactions"],
    ["Screen Share + Quality", "Room Cinema Mode", "i18n QA + E2E Tests"],
    ["Electron Build + Update", "Website SEO + Analytics", "AdMob Ads Integration"],
    ["CI/CD + Auto-Release", "React Native Mobile", "Admin Panel + Tracking"],
    ["Beta + Sentry Monitor", "Mobile UI Finalize", "Premium + Couple Mode"],
    ["v2.0 RC + Prod Deploy", "PR + Marketing Assets", "Store Submit + Docs"],
];

pub const SPRINT_DAYS: u32 = 3;

pub fn gantt() -> Result<GanttSpec> {
    let owners = ["Talha", "Ege", "Deniz"];
    let tasks = SPRINT_TASKS
        .iter()
        .zip(0u32..)
        .flat_map(|(sprint, index)| {
            owners.into_iter().zip(sprint.iter()).map(move |(owner, name)| {
                GanttTask::new(owner, *name, index * SPRINT_DAYS, SPRINT_DAYS)
            })
        })
        .collect();

    Ok(GanttSpec {
        title: "Work Breakdown (13 February to 12 March)".into(),
        start: date(2026, 2, 13)?,
        end: date(2026, 3, 14)?,
        owners: vec![
            GanttOwner::new("Talha", TALHA),
            GanttOwner::new("Ege", EGE),
            GanttOwner::new("Deniz", DENIZ),
        ],
        tasks,
        tick_interval_days: 3,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_dataset_validates() {
        tech_stack().0.validate().unwrap();
        market().0.validate().unwrap();
        revenue().0.validate().unwrap();
        post_launch().0.validate().unwrap();
        architecture().validate().unwrap();
        gantt().unwrap().validate().unwrap();
    }

    #[test]
    fn gantt_has_three_tasks_per_sprint() {
        let spec = gantt().unwrap();
        assert_eq!(spec.tasks.len(), 27);
        assert_eq!(spec.tasks[3].owner, "Talha");
        assert_eq!(spec.tasks[3].offset_days, 3);
        assert_eq!(spec.tasks[26].offset_days, 24);
    }

    #[test]
    fn architecture_has_thirteen_boxes() {
        let spec = architecture();
        assert_eq!(spec.boxes.len(), 13);
        assert_eq!(spec.links.len(), 11);
    }

    #[test]
    fn charts_fit_the_page_body() {
        for size in [
            FLOW_SIZE,
            MARKET_SIZE,
            REVENUE_SIZE,
            TECH_SIZE,
            ARCHITECTURE_SIZE,
            GANTT_SIZE,
            POST_LAUNCH_SIZE,
        ] {
            assert!(size.width_mm <= 170.0);
            assert!(size.height_mm <= 259.0);
        }
    }
}
