//! Closed metric and dimension vocabulary for report queries.
//!
//! The slices are ordered: substring fallback scans them in declaration
//! order, so ambiguous names resolve the same way every time.

/// Metric names the report API accepts.
pub const METRICS: &[&str] = &[
    "activeUsers",
    "newUsers",
    "totalUsers",
    "sessions",
    "sessionsPerUser",
    "screenPageViews",
    "screenPageViewsPerSession",
    "screenPageViewsPerUser",
    "engagedSessions",
    "engagementRate",
    "averageSessionDuration",
    "bounceRate",
    "eventCount",
    "eventsPerSession",
    "conversions",
    "totalRevenue",
    "purchaseRevenue",
    "userEngagementDuration",
    "dauPerMau",
    "dauPerWau",
    "wauPerMau",
];

/// Dimension names the report API accepts.
pub const DIMENSIONS: &[&str] = &[
    "date",
    "dateHour",
    "dateHourMinute",
    "dayOfWeek",
    "dayOfWeekName",
    "month",
    "year",
    "week",
    "hour",
    "minute",
    "country",
    "city",
    "region",
    "continent",
    "subContinent",
    "language",
    "browser",
    "operatingSystem",
    "deviceCategory",
    "platform",
    "mobileDeviceBranding",
    "mobileDeviceModel",
    "pagePath",
    "pageTitle",
    "pageLocation",
    "landingPage",
    "sessionSource",
    "sessionMedium",
    "sessionCampaignName",
    "sessionDefaultChannelGroup",
    "firstUserSource",
    "firstUserMedium",
    "eventName",
    "hostName",
];

/// Common metric names mapped to API names. Keys are lower case.
pub const METRIC_ALIASES: &[(&str, &str)] = &[
    ("page views", "screenPageViews"),
    ("pageviews", "screenPageViews"),
    ("views", "screenPageViews"),
    ("users", "totalUsers"),
    ("active users", "activeUsers"),
    ("new users", "newUsers"),
    ("sessions", "sessions"),
    ("bounce rate", "bounceRate"),
    ("engagement rate", "engagementRate"),
    ("session duration", "averageSessionDuration"),
    ("avg session duration", "averageSessionDuration"),
    ("events", "eventCount"),
    ("conversions", "conversions"),
    ("revenue", "totalRevenue"),
];

/// Common dimension names mapped to API names. Keys are lower case.
pub const DIMENSION_ALIASES: &[(&str, &str)] = &[
    ("date", "date"),
    ("day", "date"),
    ("page", "pagePath"),
    ("page path", "pagePath"),
    ("path", "pagePath"),
    ("country", "country"),
    ("city", "city"),
    ("device", "deviceCategory"),
    ("browser", "browser"),
    ("source", "sessionSource"),
    ("medium", "sessionMedium"),
    ("channel", "sessionDefaultChannelGroup"),
    ("traffic source", "sessionDefaultChannelGroup"),
    ("landing page", "landingPage"),
    ("event", "eventName"),
    ("event name", "eventName"),
];

/// Resolve a requested metric name to its canonical API name.
pub fn resolve_metric(name: &str) -> Option<&'static str> {
    resolve(name, METRIC_ALIASES, METRICS)
}

/// Resolve a requested dimension name to its canonical API name.
pub fn resolve_dimension(name: &str) -> Option<&'static str> {
    resolve(name, DIMENSION_ALIASES, DIMENSIONS)
}

/// Three-tier resolution: alias table, exact canonical match, then
/// bidirectional substring containment over the canonical list.
fn resolve(
    name: &str,
    aliases: &[(&str, &'static str)],
    canonical: &[&'static str],
) -> Option<&'static str> {
    let lower = name.to_lowercase();

    if let Some((_, api_name)) = aliases.iter().find(|(alias, _)| *alias == lower) {
        return Some(api_name);
    }

    if let Some(exact) = canonical.iter().find(|c| **c == name) {
        return Some(exact);
    }

    canonical
        .iter()
        .find(|c| {
            let valid_lower = c.to_lowercase();
            lower.contains(&valid_lower) || valid_lower.contains(&lower)
        })
        .copied()
}
