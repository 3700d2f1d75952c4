//! Domain keyword list
//!
//! A fixed set of manufacturing/AI terms used for relevance pre-filtering
//! and for candidate scoring. Matching is a case-insensitive substring test,
//! so short terms such as "ai" also match inside longer words.

/// Manufacturing and AI terms, lowercase, in priority order
///
/// Order matters where the first match wins (solution backfill).
pub const DOMAIN_KEYWORDS: &[&str] = &[
    // AI / ML
    "ai",
    "artificial intelligence",
    "machine learning",
    "ml",
    "deep learning",
    "neural network",
    "llm",
    "large language model",
    "generative ai",
    "genai",
    "computer vision",
    "object detection",
    "anomaly detection",
    "predictive maintenance",
    "predictive analytics",
    "reinforcement learning",
    // Industry 4.0 / IIoT / digital twin
    "industry 4.0",
    "iiot",
    "industrial iot",
    "digital twin",
    "smart factory",
    "edge ai",
    "industrial automation",
    // Robotics / automation
    "robot",
    "robotics",
    "cobot",
    "amr",
    "agv",
    "robotic",
    "robotics vision",
    // Quality / inspection / production
    "quality control",
    "visual inspection",
    "defect detection",
    "inspection",
    "process optimization",
    "downtime",
    "yield",
    "throughput",
    "oee",
    "cnc",
    "3d printing",
    "additive manufacturing",
    // Supply chain / logistics
    "supply chain",
    "logistics",
    "warehouse",
    "inventory",
    "demand forecasting",
    // Sectors
    "automotive",
    "food",
    "semiconductor",
    "electronics",
    "pharma",
    "aerospace",
];

/// Keywords found in `text`, in list order
///
/// # Examples
///
/// ```
/// use foundry_domain::keywords;
///
/// let found: Vec<_> = keywords::matches("Predictive Maintenance on CNC lines").collect();
/// assert!(found.contains(&"predictive maintenance"));
/// assert!(found.contains(&"cnc"));
/// ```
pub fn matches(text: &str) -> impl Iterator<Item = &'static str> {
    let lower = text.to_lowercase();
    DOMAIN_KEYWORDS
        .iter()
        .copied()
        .filter(move |kw| lower.contains(kw))
}

/// First keyword (in list order) found in `text`
pub fn first_match(text: &str) -> Option<&'static str> {
    matches(text).next()
}

/// Whether `text` mentions any domain keyword
pub fn is_relevant(text: &str) -> bool {
    first_match(text).is_some()
}
