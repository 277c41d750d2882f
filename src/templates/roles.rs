use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Header,
    CompanyName,
    Description,
    Highlights,
    Location,
    Cta,
    AboutUs,
    Services,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Accent,
    Text,
}

#[derive(Debug)]
pub struct RoleBinding {
    pub role: Role,
    /// Accepted region names, highest priority first.
    pub region_names: &'static [&'static str],
    pub tone: Tone,
}

pub const ROLE_TABLE: &[RoleBinding] = &[
    RoleBinding {
        role: Role::Header,
        region_names: &["header"],
        tone: Tone::Accent,
    },
    RoleBinding {
        role: Role::CompanyName,
        region_names: &["companyName"],
        tone: Tone::Accent,
    },
    RoleBinding {
        role: Role::Description,
        region_names: &["description"],
        tone: Tone::Text,
    },
    RoleBinding {
        role: Role::Highlights,
        region_names: &["highlights", "propertyFeatures", "features"],
        tone: Tone::Text,
    },
    RoleBinding {
        role: Role::Location,
        region_names: &["location", "contactInfo"],
        tone: Tone::Text,
    },
    RoleBinding {
        role: Role::Cta,
        region_names: &["cta", "callToAction"],
        tone: Tone::Accent,
    },
    RoleBinding {
        role: Role::AboutUs,
        region_names: &["aboutUs"],
        tone: Tone::Text,
    },
    RoleBinding {
        role: Role::Services,
        region_names: &["services"],
        tone: Tone::Text,
    },
];

impl Role {
    // ROLE_TABLE is declared in variant order.
    pub fn binding(self) -> &'static RoleBinding {
        &ROLE_TABLE[self as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Header => "header",
            Role::CompanyName => "companyName",
            Role::Description => "description",
            Role::Highlights => "highlights",
            Role::Location => "location",
            Role::Cta => "cta",
            Role::AboutUs => "aboutUs",
            Role::Services => "services",
        }
    }
}
