use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthzResponse {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_field_names() {
        let json = serde_json::to_value(HealthResponse { status: "ok".into(), storage: "ok".into() }).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "ok", "storage": "ok" }));
    }
}
