//! Query feature extraction.
//!
//! Turns a free-text job description plus any explicit inputs into a
//! [`QueryContext`]. Detection is keyword-in-substring matching and only ever
//! advisory: a missing signal means "no constraint", never a failure.

use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

use super::types::{normalize_tag, QueryContext, RetrievalParams};

/// Installation phases assumed when the caller supplies none.
pub const DEFAULT_PHASES: [&str; 3] = ["isolation", "installation", "testing"];

/// Location tags recognised in job descriptions.
///
/// Declaration order is the match priority: the first location whose keyword
/// list matches wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Location {
    Bathroom,
    Kitchen,
    Outdoor,
    Loft,
    Garage,
    Basement,
    PlantRoom,
}

impl Location {
    pub fn tag(self) -> &'static str {
        self.into()
    }

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Bathroom => &[
                "bathroom",
                "shower room",
                "shower",
                "ensuite",
                "en-suite",
                "en suite",
                "wet room",
            ],
            Self::Kitchen => &["kitchen", "utility room"],
            Self::Outdoor => &["outdoor", "outside", "garden", "external", "exterior", "driveway"],
            Self::Loft => &["loft", "attic", "roof space"],
            Self::Garage => &["garage", "workshop"],
            Self::Basement => &["basement", "cellar"],
            Self::PlantRoom => &["plant room", "switch room", "boiler room"],
        }
    }
}

/// Equipment tags recognised in job descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Equipment {
    ConsumerUnit,
    Shower,
    EvCharger,
    SolarPv,
    BatteryStorage,
    HeatPump,
    SocketOutlet,
    Lighting,
    Cooker,
    ImmersionHeater,
    SmokeAlarm,
    DistributionBoard,
    Motor,
    DataCabling,
}

impl Equipment {
    pub fn tag(self) -> &'static str {
        self.into()
    }

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::ConsumerUnit => &["consumer unit", "fuse box", "fuseboard", "fuse board"],
            Self::Shower => &["shower"],
            Self::EvCharger => &[
                "ev charger",
                "ev charging",
                "car charger",
                "electric vehicle",
                "charge point",
            ],
            Self::SolarPv => &["solar", "photovoltaic", "pv panel", "pv array"],
            Self::BatteryStorage => &["battery storage", "home battery", "battery system"],
            Self::HeatPump => &["heat pump"],
            Self::SocketOutlet => &["socket", "power point"],
            Self::Lighting => &["light", "downlight", "luminaire"],
            Self::Cooker => &["cooker", "oven", "hob"],
            Self::ImmersionHeater => &["immersion"],
            Self::SmokeAlarm => &["smoke alarm", "smoke detector", "fire alarm", "heat detector"],
            Self::DistributionBoard => &["distribution board", "sub-board", "sub board", "switchboard"],
            Self::Motor => &["motor", "pump", "compressor"],
            Self::DataCabling => &["data cabl", "network cabl", "cat5", "cat6", "structured cabling"],
        }
    }
}

/// Build the normalized query context for a request.
///
/// Explicit inputs win over inference; phases fall back to [`DEFAULT_PHASES`].
pub fn extract_context(params: &RetrievalParams) -> QueryContext {
    let description = params.job_description.to_lowercase();

    let location = params
        .location
        .as_deref()
        .map(normalize_tag)
        .filter(|tag| !tag.is_empty())
        .or_else(|| infer_location(&description).map(|l| l.tag().to_string()));

    let equipment = match params.equipment.as_deref() {
        Some(tags) => normalize_tags(tags),
        None => infer_equipment(&description)
            .into_iter()
            .map(|e| e.tag().to_string())
            .collect(),
    };

    let phases = params
        .installation_phases
        .as_deref()
        .map(normalize_tags)
        .filter(|phases| !phases.is_empty())
        .unwrap_or_else(|| DEFAULT_PHASES.iter().map(|p| p.to_string()).collect());

    QueryContext {
        work_type: params.work_type,
        location,
        equipment,
        phases,
    }
}

/// First location whose keyword list matches the lower-cased description.
pub fn infer_location(description: &str) -> Option<Location> {
    Location::iter().find(|location| matches_any(description, location.keywords()))
}

/// Every equipment tag whose keyword list matches the lower-cased description.
pub fn infer_equipment(description: &str) -> Vec<Equipment> {
    Equipment::iter()
        .filter(|equipment| matches_any(description, equipment.keywords()))
        .collect()
}

fn matches_any(description: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| description.contains(keyword))
}

fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags.iter().map(|t| normalize_tag(t)) {
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}
