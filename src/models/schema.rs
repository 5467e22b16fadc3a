//! Analysis Schema
//!
//! The target shape of a model reply, kept in two synchronized forms:
//! the example document embedded verbatim in every prompt, and the typed
//! `AnalysisReport` record used for optional reply validation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Bumped whenever the example document or `AnalysisReport` changes shape.
pub const SCHEMA_VERSION: &str = "1";

/// Top-level sections every analysis carries.
pub const REPORT_SECTIONS: [&str; 6] = [
    "bottlenecks",
    "recommendations",
    "infra_suggestions",
    "answers",
    "test_validation_analysis",
    "test_feature_justification",
];

/// Example reply embedded in the prompt as a structural anchor.
pub const ANALYSIS_RESPONSE_FORMAT: &str = r#"{
  "bottlenecks": [
    {
      "component": "<component_name>",
      "severity": "<low|medium|high>",
      "phase": "<ramp_up|steady_state|cool_down|all>",
      "description": "<short summary of the issue>",
      "evidence": [
        "<brief evidence from logs or metrics>",
        "<affected files or services>"
      ]
    }
    // Repeat for multiple bottlenecks
  ],
  "recommendations": {
    "infra": [
      {
        "priority": "<low|medium|high>",
        "action": "<infrastructure change or addition>",
        "reason": "<why this change is recommended>"
      }
    ],
    "application": [
      {
        "priority": "<low|medium|high>",
        "action": "<code-level or design-level change>",
        "reason": "<justification based on observed behavior>"
      }
    ],
    "config": [
      {
        "priority": "<low|medium|high>",
        "action": "<config parameter tuning>",
        "reason": "<performance or stability optimization>"
      }
    ],
    "api_gateway": [
      {
        "priority": "<low|medium|high>",
        "action": "<gateway-related setting or rule>",
        "reason": "<traffic shaping or error prevention>"
      }
    ]
  },
  "infra_suggestions": {
    "cpu_cores_per_node": {
      "current": <integer>,
      "suggested": <integer>,
      "note": "<reason for change>"
    },
    "memory_gb_per_node": {
      "current": <integer>,
      "suggested": <integer>,
      "note": "<reason for change>"
    },
    "disk_type": {
      "current": "<e.g., SSD>",
      "suggested": "<e.g., NVMe>",
      "note": "<justification>"
    },
    "network_bandwidth": {
      "current": "<e.g., 1Gbps>",
      "suggested": "<e.g., 10Gbps>",
      "note": "<rationale>"
    }
  },
  "answers": [
    {
      "question": "<performance-related or diagnostic question>",
      "answer": "<short direct answer>",
      "evidence": [
        "<log excerpts, metrics or test results>"
      ],
      "real_world_guidance": "<general takeaway or practical advice>"
    }
    // Repeat for multiple Q&A
  ],
  "test_validation_analysis": {
    "details": {
      "concurrent_users": {
        "expected": <integer>,
        "actual": <integer>,
        "status": "<Pass|Fail|Warning>",
        "note": "<additional context>"
      },
      "throughput_rps": {
        "expected": <integer>,
        "actual": <integer>,
        "status": "<Pass|Fail|Warning>",
        "note": "<additional context>"
      },
      "max_retries": {
        "expected": <integer>,
        "actual": <integer>,
        "status": "<Pass|Fail|Warning>",
        "note": "<additional context>"
      },
      "response_code": {
        "expected": <integer>,
        "actual": <integer>,
        "status": "<Pass|Fail|Warning>"
      },
      "max_response_time_ms": {
        "expected": <integer>,
        "actual": <integer>,
        "status": "<Pass|Fail|Warning>",
        "note": "<optional extra comment>"
      }
    }
  },
  "test_feature_justification": {
    "feature_name": "<name of the feature, e.g., login, checkout>",
    "characteristics": "<what makes this feature resource-sensitive or performance-sensitive>",
    "expected_load_behavior": "<expected user pattern or load behavior>",
    "recommendation_alignment": "<how the above influenced infra or optimization recommendations>"
  }
}"#;

/// How strictly a parsed reply is checked against `AnalysisReport`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaValidation {
    /// Any well-formed JSON is accepted unchanged
    #[default]
    Off,
    /// The reply must deserialize into `AnalysisReport`
    Strict,
}

impl std::str::FromStr for SchemaValidation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" => Ok(SchemaValidation::Off),
            "strict" => Ok(SchemaValidation::Strict),
            other => Err(format!("Unknown schema validation mode: {}", other)),
        }
    }
}

/// Typed form of a complete analysis reply.
///
/// Scalar values the model may emit as either numbers or strings are kept
/// as `serde_json::Value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub bottlenecks: Vec<Bottleneck>,
    pub recommendations: Recommendations,
    pub infra_suggestions: BTreeMap<String, SpecChange>,
    pub answers: Vec<Answer>,
    pub test_validation_analysis: TestValidationAnalysis,
    pub test_feature_justification: FeatureJustification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bottleneck {
    pub component: String,
    pub severity: String,
    #[serde(default)]
    pub phase: Option<String>,
    pub description: String,
    #[serde(default)]
    pub evidence: Vec<String>,
}

/// Recommendations grouped by the layer they act on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(default)]
    pub infra: Vec<RecommendationItem>,
    #[serde(default)]
    pub application: Vec<RecommendationItem>,
    #[serde(default)]
    pub config: Vec<RecommendationItem>,
    #[serde(default)]
    pub api_gateway: Vec<RecommendationItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub priority: String,
    pub action: String,
    pub reason: String,
}

/// Current vs. suggested value for one machine spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecChange {
    pub current: serde_json::Value,
    pub suggested: serde_json::Value,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub real_world_guidance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestValidationAnalysis {
    pub details: BTreeMap<String, ValidationCheck>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationCheck {
    pub expected: serde_json::Value,
    pub actual: serde_json::Value,
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureJustification {
    pub feature_name: String,
    pub characteristics: String,
    pub expected_load_behavior: String,
    pub recommendation_alignment: String,
}
