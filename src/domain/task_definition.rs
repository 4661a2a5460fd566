use super::ImageRef;
use crate::error::{DeployError, Result};
use serde_json::Value;

/// Fields assigned by ECS that `register-task-definition` refuses to accept
pub const SERVER_ASSIGNED_FIELDS: &[&str] = &[
    "taskDefinitionArn",
    "revision",
    "status",
    "requiresAttributes",
    "compatibilities",
    "registeredAt",
    "registeredBy",
    "deregisteredAt",
    "enableFaultInjection",
];

/// A task definition document as returned by `describe-task-definition`
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDefinition {
    document: Value,
}

impl TaskDefinition {
    pub fn from_value(document: Value) -> Result<Self> {
        if !document.is_object() {
            return Err(DeployError::MalformedDocument(
                "task definition is not a JSON object".into(),
            ));
        }
        Ok(Self { document })
    }

    pub fn family(&self) -> Option<&str> {
        self.document.get("family").and_then(Value::as_str)
    }

    pub fn revision(&self) -> Option<u64> {
        self.document.get("revision").and_then(Value::as_u64)
    }

    pub fn first_container_image(&self) -> Option<&str> {
        self.document
            .get("containerDefinitions")
            .and_then(|defs| defs.get(0))
            .and_then(|def| def.get("image"))
            .and_then(Value::as_str)
    }

    /// Copy pointing the first container at `image`, ready for re-registration
    pub fn for_registration(&self, image: &ImageRef) -> Result<Value> {
        let mut derived = self.document.clone();

        let container = derived
            .get_mut("containerDefinitions")
            .and_then(Value::as_array_mut)
            .and_then(|defs| defs.first_mut())
            .and_then(Value::as_object_mut)
            .ok_or_else(|| {
                DeployError::MalformedDocument("no container definitions to update".into())
            })?;
        container.insert("image".into(), Value::String(image.to_string()));

        if let Some(fields) = derived.as_object_mut() {
            for field in SERVER_ASSIGNED_FIELDS {
                fields.remove(*field);
            }
        }

        Ok(derived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RepositoryUri;
    use serde_json::json;

    fn described() -> Value {
        json!({
            "taskDefinitionArn": "arn:aws:ecs:us-east-1:123456789012:task-definition/web:41",
            "family": "web",
            "revision": 41,
            "status": "ACTIVE",
            "cpu": "256",
            "memory": "512",
            "containerDefinitions": [
                { "name": "web", "image": "registry.example.com/web:0ld0ld0", "essential": true },
                { "name": "sidecar", "image": "envoy:v1" }
            ],
            "requiresAttributes": [{ "name": "com.amazonaws.ecs.capability.ecr-auth" }],
            "compatibilities": ["EC2", "FARGATE"],
            "placementConstraints": [],
            "registeredAt": "2025-01-01T00:00:00.000Z",
            "registeredBy": "arn:aws:iam::123456789012:user/ci",
            "enableFaultInjection": false
        })
    }

    fn image() -> ImageRef {
        RepositoryUri::parse("registry.example.com/web")
            .unwrap()
            .image("a1b2c3d")
    }

    #[test]
    fn replaces_only_first_container_image() {
        let def = TaskDefinition::from_value(described()).unwrap();
        let derived = def.for_registration(&image()).unwrap();

        assert_eq!(
            derived["containerDefinitions"][0]["image"],
            "registry.example.com/web:a1b2c3d"
        );
        assert_eq!(derived["containerDefinitions"][1]["image"], "envoy:v1");
    }

    #[test]
    fn strips_every_server_assigned_field() {
        let def = TaskDefinition::from_value(described()).unwrap();
        let derived = def.for_registration(&image()).unwrap();
        let fields = derived.as_object().unwrap();

        for field in SERVER_ASSIGNED_FIELDS {
            assert!(!fields.contains_key(*field), "{field} should be removed");
        }
        assert_eq!(fields["family"], "web");
        assert_eq!(fields["cpu"], "256");
        assert!(fields.contains_key("placementConstraints"));
    }

    #[test]
    fn leaves_source_document_untouched() {
        let def = TaskDefinition::from_value(described()).unwrap();
        def.for_registration(&image()).unwrap();

        assert_eq!(def.revision(), Some(41));
        assert_eq!(
            def.first_container_image(),
            Some("registry.example.com/web:0ld0ld0")
        );
    }

    #[test]
    fn rejects_document_without_containers() {
        let def = TaskDefinition::from_value(json!({ "family": "web" })).unwrap();
        assert!(matches!(
            def.for_registration(&image()),
            Err(DeployError::MalformedDocument(_))
        ));

        let empty = TaskDefinition::from_value(json!({ "containerDefinitions": [] })).unwrap();
        assert!(empty.for_registration(&image()).is_err());
    }

    #[test]
    fn rejects_non_object_document() {
        assert!(TaskDefinition::from_value(json!(["web"])).is_err());
    }
}
