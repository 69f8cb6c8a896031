//! Per-view layout configuration. Each page hands its own title and active
//! navigation entry to the layout template instead of mutating shared state.

use serde::Serialize;

use crate::workflow::StageSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub slug: &'static str,
    pub title: &'static str,
}

pub const NAVIGATION: &[NavItem] = &[
    NavItem {
        slug: "request",
        title: "Request",
    },
    NavItem {
        slug: "approval",
        title: "Approval",
    },
    NavItem {
        slug: "make-payment",
        title: "Make Payment",
    },
    NavItem {
        slug: "tally-entry",
        title: "Tally Entry",
    },
    NavItem {
        slug: "rectify",
        title: "Rectify",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageConfig {
    pub title: &'static str,
    pub slug: &'static str,
    #[serde(skip)]
    pub nav: &'static [NavItem],
}

impl PageConfig {
    pub const fn new(slug: &'static str, title: &'static str) -> Self {
        Self {
            title,
            slug,
            nav: NAVIGATION,
        }
    }

    pub const fn request() -> Self {
        Self::new("request", "Payment Request")
    }

    pub fn for_stage<S: StageSpec>() -> Self {
        Self::new(S::STAGE.slug(), S::TITLE)
    }
}
