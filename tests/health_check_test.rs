use txflow_core::health::*;

#[test]
fn test_dependency_status_serialization() {
    let healthy = DependencyStatus::Healthy {
        status: "healthy".to_string(),
        latency_ms: 42,
    };

    let json = serde_json::to_value(&healthy).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["latency_ms"], 42);
    assert!(json.get("error").is_none());

    let unhealthy = DependencyStatus::Unhealthy {
        status: "unhealthy".to_string(),
        error: "timeout".to_string(),
    };

    let json = serde_json::to_value(&unhealthy).unwrap();
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["error"], "timeout");
    assert!(json.get("latency_ms").is_none());
}

#[test]
fn test_health_response_structure() {
    use std::collections::HashMap;

    let mut dependencies = HashMap::new();
    dependencies.insert(
        "postgres".to_string(),
        DependencyStatus::Healthy {
            status: "healthy".to_string(),
            latency_ms: 3,
        },
    );
    dependencies.insert(
        "redis".to_string(),
        DependencyStatus::Unhealthy {
            status: "unhealthy".to_string(),
            error: "connection refused".to_string(),
        },
    );

    let response = HealthResponse {
        status: "degraded".to_string(),
        version: "0.1.0".to_string(),
        uptime_seconds: 120,
        dependencies,
    };

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["uptime_seconds"], 120);
    assert_eq!(json["dependencies"]["postgres"]["status"], "healthy");
    assert_eq!(
        json["dependencies"]["redis"]["error"],
        "connection refused"
    );
}

#[test]
fn test_is_healthy_helper() {
    let healthy = DependencyStatus::Healthy {
        status: "healthy".to_string(),
        latency_ms: 1,
    };
    let unhealthy = DependencyStatus::Unhealthy {
        status: "unhealthy".to_string(),
        error: "boom".to_string(),
    };

    assert!(healthy.is_healthy());
    assert!(!unhealthy.is_healthy());
}
