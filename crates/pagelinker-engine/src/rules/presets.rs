use std::fmt;
use std::str::FromStr;

use super::rule::{Boundary, PatternRule};

pub const UPS_URL: &str = "https://www.ups.com/track?tracknum={value}";
pub const USPS_URL: &str = "https://tools.usps.com/go/TrackConfirmAction?tLabels={value}";
pub const FEDEX_URL: &str = "https://www.fedex.com/fedextrack/?trknbr={value}";

const TRACKING_STYLE: &str = "color: #3870e8; text-decoration: underline; font-weight: 600; \
                              cursor: pointer; border-bottom: 2px dashed #3870e8;";

/// Built-in rule bundles for public parcel trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Ups,
    Usps,
    Fedex,
    /// All carriers, in the order UPS, USPS, FedEx.
    Tracking,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown preset `{0}` (expected one of: ups, usps, fedex, tracking)")]
pub struct UnknownPreset(pub String);

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Ups, Preset::Usps, Preset::Fedex, Preset::Tracking];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Ups => "ups",
            Preset::Usps => "usps",
            Preset::Fedex => "fedex",
            Preset::Tracking => "tracking",
        }
    }

    pub fn rules(self) -> Vec<PatternRule> {
        match self {
            Preset::Ups => vec![ups()],
            Preset::Usps => vec![usps()],
            Preset::Fedex => vec![fedex()],
            Preset::Tracking => vec![ups(), usps(), fedex()],
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPreset(s.to_string()))
    }
}

fn carrier(id: &str, carrier: &str, pattern: &str, url: &str) -> PatternRule {
    PatternRule::builder(id, pattern)
        .boundary(Boundary::Word)
        .url_template(url)
        .label_template(format!("Track via {carrier}"))
        .target("_blank")
        .style(TRACKING_STYLE)
        .build()
        .expect("Invalid built-in preset")
}

pub fn ups() -> PatternRule {
    carrier("ups", "UPS", "1Z[0-9A-Z]{16}", UPS_URL)
}

pub fn usps() -> PatternRule {
    carrier(
        "usps",
        "USPS",
        "[0-9]{20,22}|[A-Z]{2}[0-9]{9}[A-Z]{2}",
        USPS_URL,
    )
}

/// Longest alternative first, so a 14-digit number is not cut at 12.
pub fn fedex() -> PatternRule {
    carrier("fedex", "FedEx", "[0-9]{20}|[0-9]{14}|[0-9]{12}", FEDEX_URL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ups", Preset::Ups)]
    #[case("USPS", Preset::Usps)]
    #[case(" FedEx ", Preset::Fedex)]
    #[case("tracking", Preset::Tracking)]
    fn parses_preset_names(#[case] name: &str, #[case] expected: Preset) {
        assert_eq!(name.parse::<Preset>(), Ok(expected));
    }

    #[test]
    fn unknown_preset_names_are_errors() {
        assert_eq!(
            "dhl".parse::<Preset>(),
            Err(UnknownPreset("dhl".to_string()))
        );
    }

    #[test]
    fn tracking_bundles_every_carrier_in_priority_order() {
        let ids: Vec<_> = Preset::Tracking
            .rules()
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(ids, vec!["ups", "usps", "fedex"]);
    }

    #[test]
    fn carrier_links_open_in_a_new_tab_with_a_title() {
        let rule = ups();
        assert_eq!(rule.link_attrs().target.as_deref(), Some("_blank"));
        assert_eq!(
            rule.title("1Z999AA10123456784", "1Z999AA10123456784").as_deref(),
            Some("Track via UPS")
        );
        assert_eq!(
            rule.href("1Z999AA10123456784", "1Z999AA10123456784"),
            "https://www.ups.com/track?tracknum=1Z999AA10123456784"
        );
    }
}
