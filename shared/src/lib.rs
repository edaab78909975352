use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Variable bindings accumulated across recognition rounds.
pub type VarMap = HashMap<String, f64>;

/// One submission: the rasterized drawing plus the variables recognized so
/// far. Wire names follow the recognizer's API (`dict_of_vars`).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RecognizeRequest {
    pub image: String,
    #[serde(rename = "dict_of_vars")]
    pub variables: VarMap,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RecognizeResponse {
    pub data: Vec<Recognition>,
}

/// One recognized component of a submitted drawing. The recognizer speaks
/// `expr`/`result`/`assign`; everything past the wire uses the full names.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Recognition {
    #[serde(rename = "expr")]
    pub expression: String,
    #[serde(rename = "result")]
    pub value: String,
    #[serde(rename = "assign", default)]
    pub is_assignment: bool,
}

impl Recognition {
    pub fn typeset_source(&self) -> String {
        format!("{} = {}", self.expression, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::{RecognizeRequest, RecognizeResponse, Recognition, VarMap};

    #[test]
    fn request_serializes_with_recognizer_field_names() {
        let mut variables = VarMap::new();
        variables.insert("x".to_string(), 5.0);
        let request = RecognizeRequest {
            image: "data:image/png;base64,AAAA".to_string(),
            variables,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["image"], "data:image/png;base64,AAAA");
        assert_eq!(json["dict_of_vars"]["x"], 5.0);
        assert!(json.get("variables").is_none());
    }

    #[test]
    fn response_maps_wire_names_onto_semantic_names() {
        let body = r#"{"data":[{"expr":"2+2","result":"4","assign":false},{"expr":"y","result":"10","assign":true}]}"#;
        let response: RecognizeResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.data.len(), 2);
        assert_eq!(response.data[0].expression, "2+2");
        assert_eq!(response.data[0].value, "4");
        assert!(!response.data[0].is_assignment);
        assert!(response.data[1].is_assignment);
    }

    #[test]
    fn missing_assign_flag_defaults_to_plain_evaluation() {
        let body = r#"{"data":[{"expr":"1+1","result":"2"}]}"#;
        let response: RecognizeResponse = serde_json::from_str(body).unwrap();
        assert!(!response.data[0].is_assignment);
    }

    #[test]
    fn typeset_source_joins_expression_and_value() {
        let result = Recognition {
            expression: "2+2".to_string(),
            value: "4".to_string(),
            is_assignment: false,
        };
        assert_eq!(result.typeset_source(), "2+2 = 4");
    }
}
