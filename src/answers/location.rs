use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static WORKPLACE_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(remote|hybrid|on-site)\b").unwrap());
static PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*?\)").unwrap());

/// USPS abbreviation paired with the full state name. DC included because
/// host typeaheads list it alongside states.
const STATE_PAIRS: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("DC", "District of Columbia"),
];

/// Suggestion text containing these reads as an administrative region rather
/// than a city and is penalized during scoring.
const NOISE_KEYWORDS: &[&str] = &["county", "district", "township", "borough"];

pub fn state_name_for(abbrev: &str) -> Option<&'static str> {
    let upper = abbrev.to_uppercase();
    STATE_PAIRS
        .iter()
        .find(|(a, _)| *a == upper)
        .map(|(_, n)| *n)
}

pub fn state_abbrev_for(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    STATE_PAIRS
        .iter()
        .find(|(_, n)| n.to_lowercase() == lower)
        .map(|(a, _)| *a)
}

fn is_state_abbrev(token: &str) -> bool {
    token.len() == 2 && state_name_for(token).is_some()
}

fn is_state_name(token: &str) -> bool {
    state_abbrev_for(token).is_some()
}

fn is_us_country(token: &str) -> bool {
    matches!(
        token.to_lowercase().as_str(),
        "united states" | "usa" | "u.s.a." | "us"
    )
}

/// Structured location parsed from a free-form string such as
/// "Austin, TX", "Austin, Texas, United States" or "Remote · Texas".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationTarget {
    pub raw: String,
    pub city: Option<String>,
    /// USPS form, e.g. "TX".
    pub state_abbrev: Option<String>,
    /// Full form, e.g. "Texas".
    pub state_name: Option<String>,
    pub country: Option<String>,
}

impl LocationTarget {
    /// Query strings to try against a typeahead, most specific first.
    /// Duplicates and empty renderings are dropped.
    pub fn candidates(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        if let Some(city) = &self.city {
            if let Some(ab) = &self.state_abbrev {
                out.push(format!("{city}, {ab}"));
            }
            if let Some(name) = &self.state_name {
                out.push(format!("{city}, {name}"));
            }
            out.push(city.clone());
        }
        if !self.raw.is_empty() {
            out.push(self.raw.clone());
        }
        out.dedup();
        out
    }

    /// Score a typeahead suggestion against this target. Higher is better;
    /// anything at or below zero is not worth clicking.
    pub fn score_suggestion(&self, suggestion: &str) -> i32 {
        let sug = suggestion.trim().to_lowercase();
        if sug.is_empty() {
            return 0;
        }
        for candidate in self.candidates() {
            if sug == candidate.to_lowercase() {
                return 100;
            }
        }
        let mut score = 0;
        if let Some(city) = &self.city {
            let city = city.to_lowercase();
            if sug.starts_with(&city) {
                score += 60;
            } else if sug.contains(&city) {
                score += 20;
            }
        }
        if self.has_state_token(&sug) {
            score += 15;
        }
        if let Some(country) = &self.country {
            if sug.contains(&country.to_lowercase()) {
                score += 5;
            }
        }
        for noise in NOISE_KEYWORDS {
            if sug.contains(noise) {
                score -= 25;
            }
        }
        score
    }

    /// Whether a committed input value looks like this location: it must name
    /// the city and carry some form of the state.
    pub fn confirms(&self, value: &str) -> bool {
        let val = value.to_lowercase();
        let city_ok = match &self.city {
            Some(city) => val.contains(&city.to_lowercase()),
            None => true,
        };
        let state_ok = if self.state_abbrev.is_none() && self.state_name.is_none() {
            true
        } else {
            self.has_state_token(&val)
        };
        city_ok && state_ok && !val.is_empty()
    }

    fn has_state_token(&self, lower_text: &str) -> bool {
        if let Some(name) = &self.state_name {
            if lower_text.contains(&name.to_lowercase()) {
                return true;
            }
        }
        if let Some(ab) = &self.state_abbrev {
            let ab = ab.to_lowercase();
            // Abbreviations must match a standalone token, "tx" inside a
            // longer word does not count.
            if lower_text
                .split(|c: char| !c.is_ascii_alphanumeric())
                .any(|tok| tok == ab)
            {
                return true;
            }
        }
        false
    }
}

fn set_state(target: &mut LocationTarget, token: &str) {
    if is_state_abbrev(token) {
        let ab = token.to_uppercase();
        target.state_name = state_name_for(&ab).map(str::to_string);
        target.state_abbrev = Some(ab);
    } else if is_state_name(token) {
        let ab = state_abbrev_for(token).map(str::to_string);
        target.state_name = ab.as_deref().and_then(state_name_for).map(str::to_string);
        target.state_abbrev = ab;
    }
}

/// Parse a free-form location string. Workplace-type tokens (Remote, Hybrid,
/// On-site) and parenthesized qualifiers are stripped before splitting on
/// commas; state-only and country-only inputs are supported.
pub fn parse_location(text: &str) -> LocationTarget {
    let raw = text.trim().to_string();
    let mut target = LocationTarget {
        raw: raw.clone(),
        ..LocationTarget::default()
    };
    if raw.is_empty() {
        return target;
    }

    let mut cleaned = raw.clone();
    if WORKPLACE_TYPE_RE.is_match(&cleaned) {
        cleaned = PAREN_RE.replace_all(&cleaned, "").to_string();
        cleaned = WORKPLACE_TYPE_RE.replace_all(&cleaned, "").to_string();
    }
    cleaned = cleaned.replace('·', " ");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    let parts: Vec<&str> = cleaned
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    match parts.len() {
        0 => {}
        1 => {
            let token = parts[0];
            if is_state_abbrev(token) || is_state_name(token) {
                set_state(&mut target, token);
                target.country = Some("United States".to_string());
            } else {
                target.city = Some(token.to_string());
            }
        }
        2 => {
            let (a, b) = (parts[0], parts[1]);
            if is_us_country(b) {
                if is_state_abbrev(a) || is_state_name(a) {
                    set_state(&mut target, a);
                } else {
                    target.city = Some(a.to_string());
                }
                target.country = Some("United States".to_string());
            } else if is_state_abbrev(b) || is_state_name(b) {
                target.city = Some(a.to_string());
                set_state(&mut target, b);
                target.country = Some("United States".to_string());
            } else {
                target.city = Some(a.to_string());
                target.country = Some(b.to_string());
            }
        }
        _ => {
            let (city, state_part, country) = (parts[0], parts[1], parts[parts.len() - 1]);
            target.city = Some(city.to_string());
            if is_state_abbrev(state_part) || is_state_name(state_part) {
                set_state(&mut target, state_part);
                target.country = Some(country.to_string());
            } else {
                target.state_name = Some(parts[1..parts.len() - 1].join(", "));
                target.country = Some(country.to_string());
            }
        }
    }

    target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_and_abbrev() {
        let loc = parse_location("Austin, TX");
        assert_eq!(loc.city.as_deref(), Some("Austin"));
        assert_eq!(loc.state_abbrev.as_deref(), Some("TX"));
        assert_eq!(loc.state_name.as_deref(), Some("Texas"));
        assert_eq!(loc.country.as_deref(), Some("United States"));
    }

    #[test]
    fn city_state_country() {
        let loc = parse_location("Seattle, Washington, United States");
        assert_eq!(loc.city.as_deref(), Some("Seattle"));
        assert_eq!(loc.state_abbrev.as_deref(), Some("WA"));
        assert_eq!(loc.country.as_deref(), Some("United States"));
    }

    #[test]
    fn state_only() {
        let loc = parse_location("Texas");
        assert_eq!(loc.city, None);
        assert_eq!(loc.state_abbrev.as_deref(), Some("TX"));
        assert_eq!(loc.country.as_deref(), Some("United States"));
    }

    #[test]
    fn strips_workplace_type() {
        let loc = parse_location("Austin, TX (Hybrid)");
        assert_eq!(loc.city.as_deref(), Some("Austin"));
        assert_eq!(loc.state_abbrev.as_deref(), Some("TX"));
    }

    #[test]
    fn candidates_most_specific_first() {
        let loc = parse_location("Austin, TX");
        let cands = loc.candidates();
        assert_eq!(cands[0], "Austin, TX");
        assert_eq!(cands[1], "Austin, Texas");
        assert_eq!(cands[2], "Austin");
    }

    #[test]
    fn scoring_prefers_exact_then_penalizes_noise() {
        let loc = parse_location("Austin, TX");
        assert_eq!(loc.score_suggestion("Austin, Texas"), 100);
        let prefix = loc.score_suggestion("Austin, Texas, United States");
        let county = loc.score_suggestion("Austin County, Texas");
        assert!(prefix > county);
        assert!(loc.score_suggestion("Austin, Texas, United States") >= 75);
    }

    #[test]
    fn confirm_requires_city_and_state() {
        let loc = parse_location("Austin, TX");
        assert!(loc.confirms("Austin, Texas, United States"));
        assert!(loc.confirms("Austin, TX"));
        assert!(!loc.confirms("Austin"));
        assert!(!loc.confirms("Dallas, TX"));
    }
}
