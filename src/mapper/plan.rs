use serde_json::Value;

use crate::error::MapError;
use crate::event::{lookup, scalar};
use crate::record::{Dimension, Measure, MeasureType, UNKNOWN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Dimension,
    Measure(MeasureType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Always emitted; the fallback stands in for an absent value.
    Required(&'static str),
    /// Emitted only when the source carries the field.
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    None,
    /// Keeps the text after the last `/`, turning an ARN into its resource id.
    LastArnSegment,
}

/// One row of an extraction plan.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub path: &'static [&'static str],
    pub target: Target,
    pub name: &'static str,
    pub presence: Presence,
    pub transform: Transform,
}

impl FieldRule {
    pub const fn dimension(name: &'static str, path: &'static [&'static str]) -> Self {
        Self {
            path,
            target: Target::Dimension,
            name,
            presence: Presence::Required(UNKNOWN),
            transform: Transform::None,
        }
    }

    pub const fn varchar(name: &'static str, path: &'static [&'static str]) -> Self {
        Self {
            path,
            target: Target::Measure(MeasureType::Varchar),
            name,
            presence: Presence::Optional,
            transform: Transform::None,
        }
    }

    pub const fn bigint(name: &'static str, path: &'static [&'static str]) -> Self {
        Self {
            path,
            target: Target::Measure(MeasureType::Bigint),
            name,
            presence: Presence::Optional,
            transform: Transform::None,
        }
    }

    pub const fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    pub const fn or(mut self, fallback: &'static str) -> Self {
        self.presence = Presence::Required(fallback);
        self
    }

    pub const fn arn_suffix(mut self) -> Self {
        self.transform = Transform::LastArnSegment;
        self
    }
}

/// Dimensions and measures extracted from one source object, in plan order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub dimensions: Vec<Dimension>,
    pub measures: Vec<Measure>,
}

/// Interprets `plan` against `source`.
pub fn extract(source: &Value, plan: &[FieldRule]) -> Result<Extracted, MapError> {
    let mut out = Extracted::default();

    for rule in plan {
        let value = match (lookup(source, rule.path)?, rule.presence) {
            (Some(found), _) => scalar(found, rule.path)?,
            (None, Presence::Required(fallback)) => fallback.to_string(),
            (None, Presence::Optional) => continue,
        };
        let value = match rule.transform {
            Transform::None => value,
            Transform::LastArnSegment => match value.rsplit_once('/') {
                Some((_, tail)) => tail.to_string(),
                None => value,
            },
        };

        match rule.target {
            Target::Dimension => out.dimensions.push(Dimension::new(rule.name, value)),
            Target::Measure(kind) => out.measures.push(Measure {
                name: rule.name.to_string(),
                value,
                kind,
            }),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PLAN: &[FieldRule] = &[
        FieldRule::dimension("ContactId", &["ContactId"]),
        FieldRule::dimension("InstanceId", &["InstanceArn"]).arn_suffix(),
        FieldRule::dimension("Method", &["InitiationMethod"]).optional(),
        FieldRule::varchar("QueueName", &["Queue", "Name"]),
        FieldRule::varchar("Alias", &["Alias"]).or(""),
        FieldRule::bigint("Duration", &["Queue", "Duration"]),
    ];

    #[test]
    fn test_required_fields_fall_back() {
        let out = extract(&json!({}), PLAN).unwrap();

        assert_eq!(
            out.dimensions,
            vec![
                Dimension::new("ContactId", "unknown"),
                Dimension::new("InstanceId", "unknown"),
            ]
        );
        assert_eq!(out.measures, vec![Measure::varchar("Alias", "")]);
    }

    #[test]
    fn test_present_fields_in_plan_order() {
        let source = json!({
            "InstanceArn": "arn:aws:connect:eu-west-2:1:instance/abc-123",
            "ContactId": "c1",
            "InitiationMethod": "INBOUND",
            "Queue": {"Duration": 42, "Name": "Sales"},
            "Alias": "main"
        });

        let out = extract(&source, PLAN).unwrap();

        assert_eq!(
            out.dimensions,
            vec![
                Dimension::new("ContactId", "c1"),
                Dimension::new("InstanceId", "abc-123"),
                Dimension::new("Method", "INBOUND"),
            ]
        );
        assert_eq!(
            out.measures,
            vec![
                Measure::varchar("QueueName", "Sales"),
                Measure::varchar("Alias", "main"),
                Measure::bigint("Duration", "42"),
            ]
        );
    }

    #[test]
    fn test_object_where_scalar_expected_is_unmappable() {
        let source = json!({"ContactId": {"nested": true}});
        let err = extract(&source, PLAN).unwrap_err();
        assert!(matches!(err, MapError::NotAScalar { ref path, .. } if path == "ContactId"));
    }
}
