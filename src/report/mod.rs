//! Content of the Let's Watch project report.
//!
//! Charts are rendered up front into [`ReportCharts`]; [`build_report`] then
//! lays the text, tables and chart images out as a [`Report`].

pub mod datasets;

use log::debug;

use crate::assembler::DocumentAssembler;
use crate::charts::{ChartFactory, ChartImage};
use crate::error::Result;
use crate::model::{Block, BulletLevel, Cover, HeadingLevel, Report, Section};
use crate::style::names;
use crate::table::ColumnWidths;
use crate::theme::Rgb;

/// Default output file name.
pub const OUTPUT_FILE_NAME: &str = "LetsWatch_Project_Report.pdf";

pub const REPORT_TITLE: &str = "Let's Watch";

/// Every chart image the report embeds.
pub struct ReportCharts {
    pub user_flow: ChartImage,
    pub market: ChartImage,
    pub revenue: ChartImage,
    pub tech_stack: ChartImage,
    pub architecture: ChartImage,
    pub gantt: ChartImage,
    pub post_launch: ChartImage,
}

impl ReportCharts {
    pub fn generate(factory: &ChartFactory) -> Result<Self> {
        let (market, market_options) = datasets::market();
        let (revenue, revenue_options) = datasets::revenue();
        let (tech, tech_options) = datasets::tech_stack();
        let (users, users_options) = datasets::post_launch();

        let charts = Self {
            user_flow: factory.flow_chart(&datasets::user_flow(), datasets::FLOW_SIZE)?,
            market: factory.horizontal_bar_chart(&market, &market_options, datasets::MARKET_SIZE)?,
            revenue: factory.pie_chart(&revenue, &revenue_options, datasets::REVENUE_SIZE)?,
            tech_stack: factory.pie_chart(&tech, &tech_options, datasets::TECH_SIZE)?,
            architecture: factory
                .architecture_diagram(&datasets::architecture(), datasets::ARCHITECTURE_SIZE)?,
            gantt: factory.gantt_chart(&datasets::gantt()?, datasets::GANTT_SIZE)?,
            post_launch: factory.trend_chart(&users, &users_options, datasets::POST_LAUNCH_SIZE)?,
        };
        debug!("generated 7 report charts");
        Ok(charts)
    }
}

fn bullets<'a>(level: BulletLevel, items: &'a [&'a str]) -> impl Iterator<Item = Block> + 'a {
    items.iter().map(move |item| Block::bullet(level, *item))
}

fn h2(text: &str) -> Block {
    Block::heading(HeadingLevel::H2, text)
}

fn h3(text: &str) -> Block {
    Block::heading(HeadingLevel::H3, text)
}

/// Lays out the complete report.
pub fn build_report(charts: &ReportCharts, assembler: &DocumentAssembler) -> Result<Report> {
    let report = Report::new(cover(assembler)?)
        .with_section(project_definition())
        .with_section(user_flow(charts))
        .with_section(direct_messages(assembler)?)
        .with_section(market(charts, assembler)?)
        .with_section(revenue(charts, assembler)?)
        .with_section(technology(charts, assembler)?)
        .with_section(roadmap(charts, assembler)?)
        .with_section(technical_notes())
        .with_section(post_launch(charts))
        .with_closing_block(Block::spacer(15.0))
        .with_closing_block(Block::paragraph(names::FOOTER, "_".repeat(60)))
        .with_closing_block(Block::paragraph(
            names::FOOTER,
            "\u{a9} 2026 Let's Watch | Talha Ka\u{11f}an Tosun",
        ));
    Ok(report)
}

fn cover(assembler: &DocumentAssembler) -> Result<Cover> {
    let details = assembler
        .build_table(
            [
                vec!["Version", "v1.4.0 (in development)"],
                vec!["Date", "12 February 2026"],
                vec![
                    "Team",
                    "Talha Ka\u{11f}an Tosun (Lead)\nEge Ceylan (Frontend)\nDeniz Eren Bozkurt (QA)",
                ],
                vec!["License", "ISC License"],
                vec!["Repository", "github.com/taalhaakaagaan/Lets-Watch"],
            ],
            &ColumnWidths::FixedThenRemainder(vec![35.0]),
        )?
        .with_bold_first_column();

    Ok(Cover::new(REPORT_TITLE)
        .with_subtitle(Some("Project Report & Technical Document".to_string()))
        .with_top_spacing_mm(35.0)
        .with_block(Block::spacer(8.0))
        .with_block(Block::Table(details)))
}

fn project_definition() -> Section {
    Section::builder("Project Definition and Features")
        .push_block(Block::body(
            "**Let's Watch** is a P2P social platform that brings people together through the \
             **Watch & Date** concept. Room creation, matching and video playback run \
             **serverless (P2P)**. The website database is used only for user data, analytics, \
             advertising and payments.",
        ))
        .push_block(h2("Key Features"))
        .extend_blocks(bullets(
            BulletLevel::First,
            &[
                "**Watch & Date Match:** open a room for a future date with filters (genre, gender, \
                 age, language), collect applications, accept one and watch together.",
                "**DM System:** persistent 1:1 messaging after a match. Chat before and after the \
                 film. AI suggestions. P2P data channel.",
                "**Discover & Search:** filter and search open rooms. Boost to stand out (premium).",
                "**P2P Video Streaming:** local video (mp4, mkv, avi) streamed directly over WebRTC \
                 without a central server.",
                "**Screen Share:** watch Netflix, YouTube and others together through screen sharing.",
                "**AI Advisor:** film suggestions and DM conversation starters through the Gemini API.",
                "**Mood Theme Engine:** automatic UI theme changes based on the film genre.",
                "**Reaction Overlay:** live emoji reactions on top of the video.",
                "**Couple Mode:** shared watch history and a shared list.",
                "**Cross-Platform:** desktop, mobile, Chrome extension and web.",
                "**5 Languages:** TR, EN, DE, FR, ES.",
            ],
        ))
        .page_break_after(true)
        .build()
}

fn user_flow(charts: &ReportCharts) -> Section {
    let steps: [(&str, &[&str]); 6] = [
        (
            "Step 1: Sign up & Profile",
            &[
                "Sign up with email and verify a 6-digit OTP.",
                "Onboarding: name, age, gender, country, language, favourite genres, block list.",
                "Mode selection: \"Watch & Date\" or \"Friend Group\".",
                "The profile is stored in the website DB.",
            ],
        ),
        (
            "Step 2: Discover & Search",
            &[
                "The \"Discover\" tab on the dashboard lists rooms as cards.",
                "Card details: owner, age, content, date, genre, language, capacity.",
                "Filters: genre, date, language, gender. Sorting: date, popularity or boost.",
                "The room list comes from the website DB for fast search.",
            ],
        ),
        (
            "Step 3: Open a Room or Apply",
            &[
                "**Opening a room:** film or series, genre, date and time, language, gender filter, \
                 age range, intro message, capacity.",
                "**Boost:** pay $0.99 to $2.99 to move to the top of the discover list and receive \
                 more applications.",
                "**Applying:** a short message and the profile are sent. Free: 3 per day. \
                 Boost ($1.99): unlimited.",
                "Application data is stored in the DB for analytics.",
            ],
        ),
        (
            "Step 4: Accept or Decline",
            &[
                "The room owner sees applications: profile, message, shared preferences.",
                "Accept: a DM channel opens automatically.",
                "Decline: a notification is sent. Match data is stored in the DB.",
            ],
        ),
        (
            "Step 5: Getting to Know Each Other over DM",
            &[
                "A 1:1 DM channel opens for a chat before the film.",
                "Messages travel over the P2P data channel (serverless). Offline messages are kept \
                 on the device.",
                "AI advisor: icebreaker and topic suggestions.",
                "Online and offline status, read receipts, typing indicator.",
                "Profanity filter, blocking and reporting are active.",
            ],
        ),
        (
            "Step 6: Watch & Date",
            &[
                "The room becomes active at the scheduled time and both sides join.",
                "The host picks a video or starts screen sharing.",
                "Synchronised playback: play, pause and seek (under 200 ms drift).",
                "Chat, reaction overlay and mood theme are active.",
                "Afterwards the DM continues: add as friend, plan the next session.",
            ],
        ),
    ];

    let mut builder = Section::builder("User Flow (Detailed)")
        .push_block(Block::image(&charts.user_flow))
        .push_block(Block::spacer(2.0));
    for (title, items) in steps {
        builder = builder
            .push_block(h3(title))
            .extend_blocks(bullets(BulletLevel::Second, items));
    }
    builder.page_break_after(true).build()
}

fn direct_messages(assembler: &DocumentAssembler) -> Result<Section> {
    let features = assembler.build_table(
        [
            ["Feature", "Description", "Technology"],
            ["Persistent Messages", "Unlimited DM after a match", "PeerJS Data Ch. + localStorage"],
            ["Before the Film", "Intro chat after acceptance", "Automatic channel creation"],
            ["After the Film", "Continue after watching", "Persistent DM channel"],
            ["AI Suggestions", "Icebreakers, topic ideas", "Gemini, context aware"],
            ["Notifications", "Push notifications", "Service Worker + Push API"],
            ["Typing...", "Realtime indicator", "P2P data channel"],
            ["Online Status", "Online indicator", "PeerJS heartbeat"],
            ["Read Receipts", "Message read state", "P2P ack message"],
            ["Block + Report", "Safety mechanism", "Client + DB reporting"],
            ["Profanity Filter", "Automatic filter", "Client-side regex"],
        ],
        &ColumnWidths::Proportional(vec![0.17, 0.38, 0.45]),
    )?;

    let performance = assembler.build_table(
        [
            ["Metric", "Value", "Note"],
            ["App Startup", "< 2 s", "Electron cold start"],
            ["P2P Connection", "< 3 s", "STUN NAT traversal"],
            ["Video Latency", "< 500 ms", "720p WebRTC"],
            ["DM Delivery", "< 100 ms", "P2P (online)"],
            ["Synchronisation", "< 200 ms", "Play, pause, seek"],
            ["RAM", "180-250 MB", "Electron + 1 stream"],
            ["Max. Peers", "4-6 (mesh)", "50+ target with an SFU"],
        ],
        &ColumnWidths::Proportional(vec![0.25, 0.20, 0.55]),
    )?;

    Ok(Section::builder("DM System (Critical Component)")
        .push_block(Block::body(
            "DM is the platform's **most critical social component**. It is the main mechanism \
             that keeps users on the platform, brings them back and keeps relationships going.",
        ))
        .push_block(Block::Table(features))
        .push_block(Block::spacer(3.0))
        .push_block(h2("Performance Metrics"))
        .push_block(Block::Table(performance))
        .page_break_after(true)
        .build())
}

fn market(charts: &ReportCharts, assembler: &DocumentAssembler) -> Result<Section> {
    let regions = assembler.build_table(
        [
            ["Region", "Prio.", "Why", "Channel"],
            ["Turkey", "1st", "University LDR, Turkish", "IG, TikTok, campus"],
            ["Germany", "1st", "Turkish diaspora", "Turkish-German communities"],
            ["USA/Canada", "2nd", "Dating market", "Reddit, Product Hunt"],
            ["Spain/France", "2nd", "Language, Erasmus", "Erasmus communities"],
        ],
        &ColumnWidths::Proportional(vec![0.14, 0.08, 0.35, 0.43]),
    )?;

    let mut rows = vec![vec![
        "Feature".to_string(),
        "Teleparty".into(),
        "Rave".into(),
        "Kosmi".into(),
        "Scener".into(),
        "Let's Watch".into(),
    ]];
    for (feature, cells) in [
        ("Watch & Date", ["No", "No", "No", "No", "Yes"]),
        ("DM System", ["No", "No", "No", "No", "Yes"]),
        ("Local P2P", ["No", "No", "No", "No", "Yes"]),
        ("AI Advisor", ["No", "No", "No", "No", "Yes"]),
        ("Couple Mode", ["No", "No", "No", "No", "Yes"]),
        ("Screen Share", ["No", "No", "Yes", "Yes", "Yes"]),
        ("Desktop App", ["No", "No", "No", "No", "Yes"]),
        ("Mood Theme", ["No", "No", "No", "No", "Yes"]),
        ("5+ Languages", ["No", "Few", "No", "No", "Yes"]),
        ("Open Source", ["No", "No", "No", "No", "Yes"]),
    ] {
        let mut row = vec![feature.to_string()];
        row.extend(cells.iter().map(|cell| cell.to_string()));
        rows.push(row);
    }
    let comparison = assembler
        .build_table(
            rows,
            &ColumnWidths::Proportional(vec![0.20, 0.15, 0.13, 0.13, 0.15, 0.24]),
        )?
        .with_font_sizes(7.5, 7.5)
        .with_centered_columns_from(1)
        .with_column_fill(5, Rgb::from_u32(0xFFF3E0))?;

    Ok(Section::builder("Target Audience and Market Analysis")
        .push_block(h2("Primary Audience"))
        .extend_blocks(bullets(
            BulletLevel::First,
            &[
                "**Young people looking to date (18-28):** a natural way to meet while watching a film.",
                "**Long-distance relationships (LDR):** around 14M LDR couples worldwide.",
                "**Gen-Z couples:** digital natives with a co-viewing culture.",
                "**Friend groups:** watch parties of 2 to 4 people.",
            ],
        ))
        .push_block(h2("Geographic Priority"))
        .push_block(Block::Table(regions))
        .push_block(h2("Competitor Comparison"))
        .push_block(Block::image(&charts.market))
        .push_block(Block::Table(comparison))
        .page_break_after(true)
        .build())
}

fn revenue(charts: &ReportCharts, assembler: &DocumentAssembler) -> Result<Section> {
    let channels = assembler.build_table(
        [
            ["Channel", "How It Works", "Estimate (10K users)"],
            ["Room Boost", "Pay $0.99-2.99 to rise to the top of Discover", "$300-600/month"],
            ["Application Boost", "Free 3/day. Unlimited for $1.99", "$200-400/month"],
            ["Premium ($2.99/month)", "HD, unlimited rooms, themes, no ads", "$300-600/month"],
            ["Rewarded Ads", "Watch 30 s = 1 boost or 3 applications", "$200-400/month"],
            ["Banner Ads", "Dashboard + waiting screen (AdMob)", "$100-200/month"],
            ["Theme Market", "$0.99-1.99 theme or emoji packs", "$50-150/month"],
        ],
        &ColumnWidths::Proportional(vec![0.17, 0.50, 0.33]),
    )?;

    let payments = assembler.build_table(
        [
            ["Platform", "Payment Method", "Commission", "Why"],
            ["iOS (Mobile)", "Apple In-App Purchase", "30%", "Required by Apple, no other option"],
            [
                "Android (Mobile)",
                "Google Play Billing",
                "15% (first $1M)",
                "Required by Google, 15% up to $1M",
            ],
            [
                "Desktop (Electron)",
                "Iyzico (TR) + Stripe (Global)",
                "2.5-2.9%",
                "No store commission. Most profitable channel",
            ],
            [
                "Website",
                "Iyzico (TR) + Stripe (Global)",
                "2.5-2.9%",
                "No store restrictions on the web",
            ],
        ],
        &ColumnWidths::Proportional(vec![0.15, 0.25, 0.12, 0.48]),
    )?;

    let server_roles = assembler.build_table(
        [
            ["Role", "Description", "Examples"],
            ["User Registration", "Profile and verification", "name, age, preferences"],
            ["Analytics", "Behaviour tracking", "DAU, match rate, popular genres"],
            ["Advertising", "AdMob config", "impressions, clicks, revenue"],
            ["Payments", "Boost and premium records", "transaction ID, amount, date"],
            ["Room Index", "Discover list", "room ID, filters, boost"],
            ["Safety", "Blocks and complaints", "reporter, reported, reason"],
            ["Notifications", "Push delivery", "application, DM, match"],
        ],
        &ColumnWidths::Proportional(vec![0.15, 0.38, 0.47]),
    )?;

    let budget = assembler.build_table(
        [
            ["Item", "Monthly", "6 Months", "Note"],
            ["Web Hosting + DB", "$0-5", "$0-30", "Vercel + PlanetScale free tier"],
            ["TURN Server", "$10", "$60", "Hetzner VPS"],
            ["Domain + SSL", "$1", "$6", ".com"],
            ["App Store", "-", "$125", "Google $25 + Apple $99"],
            ["Advertising", "$50-100", "$300-600", "Targeted TikTok/IG"],
            ["Influencers", "$20", "$120", "Micro-influencer partnerships"],
            ["TOTAL", "$81-136", "$611-941", ""],
        ],
        &ColumnWidths::Proportional(vec![0.22, 0.14, 0.14, 0.50]),
    )?;

    Ok(Section::builder("Revenue Model, Payments and Budget")
        .push_block(Block::image(&charts.revenue))
        .push_block(Block::spacer(1.5))
        .push_block(h2("Revenue Channels"))
        .push_block(Block::Table(channels))
        .push_block(Block::spacer(2.0))
        .push_block(h2("Payment System (Tiered)"))
        .push_block(Block::body(
            "Each platform uses the most suitable payment method. Desktop has no store \
             commission, so users are steered towards paying on desktop.",
        ))
        .push_block(Block::Table(payments))
        .push_block(Block::spacer(1.5))
        .push_block(h3("Why Iyzico + Stripe?"))
        .extend_blocks(bullets(
            BulletLevel::First,
            &[
                "**Iyzico:** a Turkish company. TL, BKM Express, local cards. Required for the \
                 Turkish market.",
                "**Stripe:** 135+ countries, USD/EUR, the best developer API. Ideal for the \
                 global market.",
                "**Commission comparison:** a $2.99 boost leaves $2.09 with Apple and $2.84 with \
                 Iyzico. **Desktop is 36% more profitable.**",
                "**Advertising strategy:** NO ads during the film or in DMs. Only on the \
                 dashboard and waiting screens.",
            ],
        ))
        .push_block(Block::spacer(1.5))
        .push_block(h2("Server (Website DB) Roles"))
        .push_block(Block::body(
            "Rooms and matching run serverless over P2P. The server is used only for the \
             following purposes:",
        ))
        .push_block(Block::Table(server_roles))
        .push_block(h2("Budget Plan"))
        .push_block(Block::Table(budget))
        .page_break_after(true)
        .build())
}

fn technology(charts: &ReportCharts, assembler: &DocumentAssembler) -> Result<Section> {
    let stack = assembler.build_table(
        [
            ["Technology", "Usage"],
            ["Electron v39", "Desktop wrapper, file access"],
            ["React 18", "UI, SPA, component architecture"],
            ["React Native (Expo)", "Mobile (iOS + Android)"],
            ["Next.js", "Website + API routes + DB"],
            ["PeerJS (WebRTC)", "P2P stream + DM + rooms"],
            ["Website DB (MySQL)", "Users, analytics, payments, room index"],
            ["Gemini AI", "Film suggestions, chat suggestions"],
            ["AdMob", "Ads (mobile + desktop)"],
            ["Iyzico + Stripe", "Payments (TR + global)"],
            ["Nodemailer + Push", "Email OTP + notifications"],
        ],
        &ColumnWidths::Proportional(vec![0.3, 0.7]),
    )?;

    Ok(Section::builder("Technologies and Architecture")
        .push_block(Block::image(&charts.tech_stack))
        .push_block(Block::spacer(1.5))
        .push_block(Block::Table(stack))
        .push_block(Block::spacer(3.0))
        .push_block(h2("System Architecture"))
        .push_block(Block::image(&charts.architecture))
        .extend_blocks(bullets(
            BulletLevel::First,
            &[
                "**P2P-First:** video, chat, DM and synchronisation are serverless. The server \
                 only tracks data.",
                "**Website DB:** profiles, room index, payments, ads, analytics. Accessed through \
                 API routes.",
                "**Hybrid Discovery:** the room list comes from the DB (fast), the connection \
                 from P2P (serverless).",
                "**Tiered Payments:** mobile uses IAP, desktop and web use Iyzico + Stripe.",
            ],
        ))
        .page_break_after(true)
        .build())
}

fn sprint_rows() -> Vec<Vec<String>> {
    let header = [
        "Sprint",
        "Talha Ka\u{11f}an Tosun\n(Lead / Backend / Infra)",
        "Ege Ceylan\n(Frontend / Web / Mobile)",
        "Deniz Eren Bozkurt\n(QA / Extension / AI)",
    ];
    let sprints: [(&str, [[&str; 3]; 3]); 9] = [
        (
            "S1\n13-15\nFeb",
            [
                ["PeerJS signaling config", "P2P room broadcast logic", "Connection test setup"],
                ["Download site (Next.js)", "DB schema: users, rooms", "Vercel deploy + API route"],
                ["Chrome Ext. manifest v3", "Side panel skeleton", "Extension-app messaging"],
            ],
        ),
        (
            "S2\n16-18\nFeb",
            [
                ["STUN/TURN (Coturn) setup", "NAT traversal test", "Connection diagnostics"],
                ["Onboarding UI redesign", "Gender/age/genre form", "Profile DB save API"],
                ["AI advisor prompt engine", "Film suggestion engine", "Chat suggestion mode"],
            ],
        ),
        (
            "S3\n19-21\nFeb",
            [
                [
                    "Match API: room CRUD",
                    "Filter + search endpoint",
                    "Application accept/decline API",
                ],
                ["Discover page UI", "Room cards + filter panel", "Application form UI"],
                ["DM: P2P data channel", "Messages in localStorage", "Typing/read indicators"],
            ],
        ),
        (
            "S4\n22-24\nFeb",
            [
                ["Payments: Iyzico + Stripe", "Boost backend logic", "Application limit (3/day)"],
                ["DM chat UI (1:1)", "Online/offline + alerts", "Block/report UI"],
                ["Mood theme engine", "Genre based theming", "Reaction overlay"],
            ],
        ),
        (
            "S5\n25-27\nFeb",
            [
                ["Screen share + quality", "720p/1080p bandwidth", "Multi-peer mesh test"],
                ["Room Cinema Mode UI", "Emoji picker + animation", "Couple mode UI"],
                ["i18n QA (5 languages)", "E2E: match + DM flow", "Boost/application tests"],
            ],
        ),
        (
            "S6\n28 Feb\n-2 Mar",
            [
                ["Electron build (Win+Linux)", "Auto-update config", "NSIS installer"],
                ["Website SEO tuning", "Analytics integration", "Store screenshots"],
                ["AdMob SDK integration", "Rewarded ad -> boost", "Banner placement test"],
            ],
        ),
        (
            "S7\n3-5\nMar",
            [
                ["CI/CD (GitHub Actions)", "Auto-release pipeline", "Backend deploy automation"],
                ["React Native mobile init", "Mobile auth + onboarding", "Navigation structure"],
                ["Admin panel + tracking", "Analytics: DAU, match %", "Security audit"],
            ],
        ),
        (
            "S8\n6-8\nMar",
            [
                ["Beta release + Sentry", "Error monitoring", "Load test (Match API)"],
                ["Mobile: discover+DM+room", "Push notifications", "Responsive polish"],
                ["Premium feature flags", "Couple mode backend", "Shared list"],
            ],
        ),
        (
            "S9\n9-12\nMar",
            [
                ["v2.0 RC + prod deploy", "Monitoring dashboard", "Hotfix process"],
                ["Mobile finalize + store", "Promo video + PR", "Product Hunt prep"],
                ["Store submission", "Legal/license check", "Documentation"],
            ],
        ),
    ];

    let mut rows = vec![header.iter().map(|cell| cell.to_string()).collect::<Vec<_>>()];
    for (label, people) in sprints {
        let mut row = vec![label.to_string()];
        row.extend(people.iter().map(|tasks| {
            tasks
                .iter()
                .map(|task| format!("\u{2022} {task}"))
                .collect::<Vec<_>>()
                .join("\n")
        }));
        rows.push(row);
    }
    rows
}

fn roadmap(charts: &ReportCharts, assembler: &DocumentAssembler) -> Result<Section> {
    let sprints = assembler
        .build_table(
            sprint_rows(),
            &ColumnWidths::Proportional(vec![0.08, 0.31, 0.31, 0.30]),
        )?
        .with_font_sizes(7.0, 6.5)
        .with_bold_first_column()
        .with_column_fill(0, Rgb::from_u32(0xF0F0F0))?
        .with_column_fill(1, Rgb::from_u32(0xFFF8F0))?
        .with_column_fill(2, Rgb::from_u32(0xF0F6FF))?
        .with_column_fill(3, Rgb::from_u32(0xF0FFF4))?;

    Ok(Section::builder("Work Breakdown and Roadmap")
        .push_block(Block::paragraph(
            names::SUBTITLE,
            "Start: 13 February 2026 | Each task: 3 days | No fixed end date | 3 people, 9 sprints",
        ))
        .push_block(Block::image(&charts.gantt))
        .push_block(Block::page_break())
        .push_block(Block::Table(sprints))
        .push_block(Block::spacer(2.0))
        .push_block(Block::body("**Why this plan works:**"))
        .extend_blocks(bullets(
            BulletLevel::First,
            &[
                "**Correct dependency order:** S1 infrastructure, S2 NAT + AI, S3 match + DM \
                 (core), S4 payments + UI, S5 quality, S6 build, S7 mobile + CI, S8 beta, \
                 S9 release.",
                "**Parallel work:** in every sprint the 3 people work independently and never \
                 wait on each other.",
                "**Balanced load:** Talha = infra + backend, Ege = UI + web + mobile, Deniz = \
                 QA + AI + extension. Everyone in their own area.",
                "**Testing built in:** Deniz tests in every sprint, with full regression in S5 \
                 and S9.",
            ],
        ))
        .page_break_after(true)
        .build())
}

fn technical_notes() -> Section {
    Section::builder("Technical Considerations")
        .push_block(h2("Security"))
        .extend_blocks(bullets(
            BulletLevel::First,
            &[
                "**WebRTC SRTP:** video and DMs are encrypted.",
                "**Context Isolation:** XSS protection in Electron.",
                "**DM:** profanity filter, blocking, reporting. KVKK compliant.",
                "**Match:** rate limiting, fake profile detection, spam protection.",
                "**Payments:** Iyzico and Stripe are PCI DSS compliant. Card data is never \
                 stored on the server.",
            ],
        ))
        .push_block(h2("Performance"))
        .extend_blocks(bullets(
            BulletLevel::First,
            &[
                "**TURN:** required infrastructure for symmetric NAT.",
                "**Upload:** at least 3 Mbps for 720p. Users are warned.",
                "**DB Latency:** room list under 200 ms (edge functions).",
                "**DM:** under 100 ms online (P2P), store-and-forward when offline.",
            ],
        ))
        .push_block(h2("Development"))
        .extend_blocks(bullets(
            BulletLevel::First,
            &[
                "**Vibe Coding:** fast AI-assisted development.",
                "**Components:** each one is a JSX + CSS pair.",
                "**i18n:** all text comes from translation.json.",
                "**Git Flow:** feature branch, then PR, then main.",
            ],
        ))
        .page_break_after(true)
        .build()
}

fn post_launch(charts: &ReportCharts) -> Section {
    Section::builder("Post-Launch Plan")
        .push_block(Block::image(&charts.post_launch))
        .push_block(Block::spacer(1.5))
        .extend_blocks(bullets(
            BulletLevel::First,
            &[
                "**March, Beta:** Product Hunt, Reddit. Match beta. Website live.",
                "**April, Community:** Discord, DM v2, Couple Mode v1.",
                "**May, v2.5:** subtitles, playlists, theme marketplace.",
                "**June, Mobile:** App Store + Play Store. AdMob live.",
                "**July, Revenue:** premium tier. Target: $1000+/month.",
                "**August, Scale:** SFU for 50+ people. Video calls in DMs.",
            ],
        ))
        .push_block(h2("PR Plan"))
        .extend_blocks(bullets(
            BulletLevel::First,
            &[
                "**LDR:** Reddit r/LongDistance, Facebook groups.",
                "**Influencers:** LDR couples on TikTok and YouTube.",
                "**Campus:** Erasmus and university clubs.",
                "**ASO:** \"watch and date\", \"couple app\", \"long distance\".",
            ],
        ))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::parse_runs;

    fn all_text(section: &Section) -> Vec<String> {
        section
            .blocks()
            .iter()
            .filter_map(|block| match block {
                Block::Paragraph(paragraph) => Some(paragraph.text().to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn text_sections_parse_as_markup() {
        for section in [project_definition(), technical_notes()] {
            for text in all_text(&section) {
                parse_runs(&text).unwrap_or_else(|err| panic!("{text}: {err}"));
            }
        }
    }

    #[test]
    fn sprint_table_is_rectangular() {
        let rows = sprint_rows();
        assert_eq!(rows.len(), 10);
        assert!(rows.iter().all(|row| row.len() == 4));
        assert!(rows[1][1].starts_with("\u{2022} PeerJS"));
        assert_eq!(rows[1][1].lines().count(), 3);
    }

    #[test]
    fn text_sections_end_with_page_breaks() {
        assert!(project_definition().ends_with_page_break());
        assert!(technical_notes().ends_with_page_break());
    }
}
