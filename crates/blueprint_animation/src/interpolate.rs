//! Attribute interpolation
//!
//! Numbers interpolate linearly. Strings interpolate the numbers embedded in
//! them: the target's text is kept and each number in it is paired, by index,
//! with the number at the same index in the start string. Target numbers with
//! no partner stay fixed, and a target with no numbers at all is constant.

use std::sync::OnceLock;

use blueprint_core::AttrValue;
use regex::Regex;

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[-+]?(?:\d+\.?\d*|\.?\d+)(?:[eE][-+]?\d+)?").expect("valid number pattern")
    })
}

/// Piece of an interpolated string
#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    Literal(String),
    Number { from: f64, to: f64 },
}

/// Maps eased progress to an attribute value
#[derive(Clone, Debug, PartialEq)]
pub enum Interpolator {
    Number { from: f64, to: f64 },
    Text(Vec<Segment>),
    Constant(AttrValue),
}

impl Interpolator {
    pub fn at(&self, t: f64) -> AttrValue {
        match self {
            Interpolator::Number { from, to } => AttrValue::Number(lerp(*from, *to, t)),
            Interpolator::Constant(value) => value.clone(),
            Interpolator::Text(segments) => {
                let mut out = String::new();
                for segment in segments {
                    match segment {
                        Segment::Literal(text) => out.push_str(text),
                        Segment::Number { from, to } => {
                            let value = if t >= 1.0 { *to } else { lerp(*from, *to, t) };
                            out.push_str(&format_number(value));
                        }
                    }
                }
                AttrValue::Text(out)
            }
        }
    }
}

/// Build an interpolator from the current value (if any) to `to`
pub fn interpolate(from: Option<&AttrValue>, to: &AttrValue) -> Interpolator {
    match to {
        AttrValue::Number(to) => Interpolator::Number {
            from: from.and_then(AttrValue::as_number).unwrap_or(0.0),
            to: *to,
        },
        AttrValue::Text(target) => {
            let start = match from {
                Some(AttrValue::Text(s)) => s.clone(),
                Some(AttrValue::Number(n)) => format_number(*n),
                None => String::new(),
            };
            interpolate_text(&start, target)
        }
    }
}

fn interpolate_text(from: &str, to: &str) -> Interpolator {
    let pattern = number_pattern();
    let mut starts = pattern
        .find_iter(from)
        .filter_map(|m| m.as_str().parse::<f64>().ok());

    let mut segments = Vec::new();
    let mut last = 0;
    for m in pattern.find_iter(to) {
        let Ok(target) = m.as_str().parse::<f64>() else {
            continue;
        };
        if m.start() > last {
            segments.push(Segment::Literal(to[last..m.start()].to_string()));
        }
        let start = starts.next().unwrap_or(target);
        segments.push(Segment::Number {
            from: start,
            to: target,
        });
        last = m.end();
    }

    if segments.is_empty() {
        return Interpolator::Constant(AttrValue::Text(to.to_string()));
    }
    if last < to.len() {
        segments.push(Segment::Literal(to[last..].to_string()));
    }
    Interpolator::Text(segments)
}

/// Print without a trailing `.0` and without float noise past 6 decimals
fn format_number(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_interpolate_linearly() {
        let i = interpolate(Some(&AttrValue::Number(10.0)), &AttrValue::Number(20.0));
        assert_eq!(i.at(0.0), AttrValue::Number(10.0));
        assert_eq!(i.at(0.5), AttrValue::Number(15.0));
        assert_eq!(i.at(1.0), AttrValue::Number(20.0));
    }

    #[test]
    fn test_missing_start_counts_as_zero() {
        let i = interpolate(None, &AttrValue::Number(8.0));
        assert_eq!(i.at(0.25), AttrValue::Number(2.0));

        let i = interpolate(Some(&AttrValue::from("4")), &AttrValue::Number(8.0));
        assert_eq!(i.at(0.5), AttrValue::Number(6.0));
    }

    #[test]
    fn test_embedded_numbers_interpolate() {
        let i = interpolate(
            Some(&AttrValue::from("translate(0,10)")),
            &AttrValue::from("translate(100,20)"),
        );
        assert_eq!(i.at(0.5), AttrValue::from("translate(50,15)"));
        assert_eq!(i.at(1.0), AttrValue::from("translate(100,20)"));
    }

    #[test]
    fn test_unpaired_target_numbers_stay_fixed() {
        let i = interpolate(Some(&AttrValue::from("M0")), &AttrValue::from("M10L5"));
        assert_eq!(i.at(0.5), AttrValue::from("M5L5"));
    }

    #[test]
    fn test_text_without_numbers_is_constant() {
        let i = interpolate(Some(&AttrValue::from("red")), &AttrValue::from("blue"));
        assert_eq!(i.at(0.0), AttrValue::from("blue"));
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
        assert_eq!(format_number(-0.0000001), "0");
    }
}
