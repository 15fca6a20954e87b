//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use chrono::{DateTime, Utc};

use crate::models::{Entity, Material, Profile, User};

/// Trait for human-readable key-value output.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

impl PrettyPrint for Entity {
    fn pretty_print(&self) -> String {
        let common = self.common();
        let header = format!("Entity: {}", common.eid());
        let divider = "─".repeat(header.chars().count().max(30));

        let mut lines = vec![
            header,
            divider,
            format!("Name:           {}", common.name),
            format!("Type:           {}", common.entity_type()),
        ];

        if let Some(ref description) = common.description {
            if !description.is_empty() {
                lines.push(format!("Description:    {}", description));
            }
        }

        lines.push(format!("Created:        {}", timestamp(common.created_at())));
        lines.push(format!("Edited:         {}", timestamp(common.edited_at())));

        if !self.is_specific() {
            lines.push("Model:          generic".to_string());
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Material {
    fn pretty_print(&self) -> String {
        let common = self.common();
        let header = format!("Material: {}", common.eid());
        let divider = "─".repeat(header.chars().count().max(30));

        let mut lines = vec![
            header,
            divider,
            format!("Name:           {}", common.name),
            format!("Type:           {}", common.kind()),
            format!("Library:        {}", common.library_name()),
        ];

        if let Some(ref description) = common.description {
            lines.push(format!("Description:    {}", description));
        }

        lines.push(format!("Edited:         {}", timestamp(common.edited_at())));
        lines.join("\n")
    }
}

impl PrettyPrint for Profile {
    fn pretty_print(&self) -> String {
        let header = format!("Profile: {} {}", self.first_name, self.last_name);
        let divider = "─".repeat(header.chars().count().max(30));

        let roles = self
            .roles
            .iter()
            .map(|role| role.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let mut lines = vec![
            header,
            divider,
            format!("User ID:        {}", self.id()),
            format!("Email:          {}", self.email),
            format!("Tenant:         {}", self.tenant),
        ];

        if !roles.is_empty() {
            lines.push(format!("Roles:          {}", roles));
        }

        for license in &self.licenses {
            let state = if license.valid { "valid" } else { "invalid" };
            lines.push(format!(
                "License:        {} ({}, expires {})",
                license.name,
                state,
                license.expires_at.format("%Y-%m-%d")
            ));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for User {
    fn pretty_print(&self) -> String {
        let header = format!("User: {}", self.user_name());
        let divider = "─".repeat(header.chars().count().max(30));

        let mut lines = vec![
            header,
            divider,
            format!("Name:           {}", self.full_name()),
            format!("Email:          {}", self.email),
        ];

        if let Some(enabled) = self.is_enabled {
            lines.push(format!("Enabled:        {}", if enabled { "yes" } else { "no" }));
        }

        if let Some(at) = self.last_login_at() {
            lines.push(format!("Last Login:     {}", timestamp(at)));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_pretty_print_format() {
        let entity: Entity = serde_json::from_value(json!({
            "eid": "experiment:79b12479-2b5d-490f-be52-d60c53f16719",
            "name": "Suzuki coupling",
            "description": "",
            "type": "experiment",
            "createdAt": "2021-10-22T13:43:13.399Z",
            "editedAt": "2021-10-22T13:43:13.399Z"
        }))
        .unwrap();

        let output = entity.pretty_print();
        assert!(output.starts_with("Entity: experiment:"));
        assert!(output.contains("Name:           Suzuki coupling"));
        assert!(!output.contains("Description:"));
        assert!(!output.contains("generic"));
    }

    #[test]
    fn test_generic_entity_is_marked() {
        let entity: Entity = serde_json::from_value(json!({
            "eid": "bioSequence:79b12479-2b5d-490f-be52-d60c53f16719",
            "name": "Plasmid",
            "type": "bioSequence",
            "createdAt": "2021-10-22T13:43:13.399Z",
            "editedAt": "2021-10-22T13:43:13.399Z"
        }))
        .unwrap();

        assert!(entity.pretty_print().contains("Model:          generic"));
    }
}
