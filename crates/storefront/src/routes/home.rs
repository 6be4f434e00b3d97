//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::filters;
use crate::middleware::CspNonce;

/// A titled paragraph shown in one of the home page grids.
pub struct Section {
    pub title: &'static str,
    pub body: &'static str,
}

/// Business contact details shown in the contact and location sections.
pub struct ContactDetails {
    pub address: &'static str,
    pub phone: &'static str,
    pub email: &'static str,
    pub hours: &'static str,
}

pub const HERO_TAGS: &[&str] = &["Precision Engineering", "Operational Efficiency"];

pub const HIGHLIGHTS: &[Section] = &[
    Section {
        title: "Advanced Manufacturing",
        body: "Tooling for modern CNC machining, from prototypes to production runs.",
    },
    Section {
        title: "Quality Assured",
        body: "Genuine tools from established manufacturers, backed by their warranties.",
    },
    Section {
        title: "Expert Team",
        body: "Application engineers who have spent years on the shop floor.",
    },
    Section {
        title: "Strategic Location",
        body: "Based in Coimbatore, serving Tamil Nadu and Kerala.",
    },
];

pub const SERVICES: &[Section] = &[
    Section {
        title: "Tool Supply & Distribution",
        body: "Cutting tools, inserts, holders and fluids from leading brands, delivered on time.",
    },
    Section {
        title: "Application Support & Tool Selection",
        body: "We match tool geometry, grade and coating to your material and machine.",
    },
    Section {
        title: "On-Site Trials & Technical Assistance",
        body: "Trials at your facility to prove cycle time and tool life before you commit.",
    },
    Section {
        title: "Tooling Consultancy",
        body: "Process reviews that cut tooling cost per component.",
    },
];

pub const SOLUTIONS: &[Section] = &[
    Section {
        title: "Advanced Tooling Solutions",
        body: "High-performance milling, drilling and turning tools for demanding materials.",
    },
    Section {
        title: "Process Optimization",
        body: "Cutting data and strategy changes that raise throughput on existing machines.",
    },
    Section {
        title: "Cost Reduction Programs",
        body: "Regrinding, standardisation and consolidated supply to lower spend.",
    },
    Section {
        title: "Technical Training",
        body: "Hands-on sessions for operators and programmers on tool selection and care.",
    },
];

pub const SUPPLIERS: &[&str] = &[
    "ISCAR",
    "Ingersoll Cutting Tools",
    "Master Fluids",
    "Spectra Tools",
];

pub const CONTACT: ContactDetails = ContactDetails {
    address: "23, 8th Street, Tatabad, Coimbatore - 641012, Tamil Nadu",
    phone: "+91-99940 94443",
    email: "nexusautomation.in@gmail.com",
    hours: "Mon - Sat: 9:00 AM - 6:00 PM",
};

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub hero_tags: &'static [&'static str],
    pub highlights: &'static [Section],
    pub services: &'static [Section],
    pub solutions: &'static [Section],
    pub suppliers: &'static [&'static str],
    pub contact: &'static ContactDetails,
    pub nonce: String,
}

/// Display the home page.
#[instrument(skip(nonce))]
pub async fn home(CspNonce(nonce): CspNonce) -> impl IntoResponse {
    HomeTemplate {
        hero_tags: HERO_TAGS,
        highlights: HIGHLIGHTS,
        services: SERVICES,
        solutions: SOLUTIONS,
        suppliers: SUPPLIERS,
        contact: &CONTACT,
        nonce,
    }
}
