//! Model definition files.
//!
//! A model file is a [`ModelDefinition`] with an optional `[graphql]`
//! section holding the schema configuration.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use octoql_graphql::{GraphQLConfig, SchemaSynthesizer};
use octoql_model::ModelDefinition;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct ModelFile {
    #[serde(flatten)]
    pub model: ModelDefinition,
    #[serde(default)]
    pub graphql: GraphQLConfig,
}

impl ModelFile {
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model file {}", path.display()))?;
        let file = Self::parse(&source)
            .with_context(|| format!("Invalid model file {}", path.display()))?;
        debug!(
            path = %path.display(),
            collections = file.model.collections.len(),
            relations = file.model.relations.len(),
            "Loaded model file"
        );
        Ok(file)
    }

    pub fn parse(source: &str) -> Result<Self> {
        let file: Self = toml::from_str(source)?;
        file.graphql.validate().map_err(|e| anyhow!(e))?;
        Ok(file)
    }

    /// Builds the inventory and wraps it in a synthesizer.
    pub fn into_synthesizer(self) -> Result<SchemaSynthesizer> {
        let config = self.graphql.to_schema_builder_config();
        let inventory = self.model.into_inventory()?;
        Ok(SchemaSynthesizer::new(inventory, config))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const BLOG_MODEL: &str = r#"
[graphql]
max_depth = 10

[[enums]]
name = "post_status"
variants = ["draft", "published"]

[[collections]]
name = "person"
primary_key = ["row_id"]
fields = [
    { name = "row_id", type = "Int!" },
    { name = "name", type = "String" },
]
rows = [
    { row_id = 1, name = "Ada" },
    { row_id = 2, name = "Grace" },
]

[[collections]]
name = "post"
fields = [
    { name = "row_id", type = "Int!" },
    { name = "author_id", type = "Int" },
    { name = "title", type = "String!" },
    { name = "status", type = "post_status!" },
]
rows = [
    { row_id = 10, author_id = 1, title = "Engines", status = "published" },
    { row_id = 11, author_id = 2, title = "Compilers", status = "draft" },
]

[[relations]]
name = "author"
head = "person"
tail = "post"
head_fields = ["row_id"]
tail_fields = ["author_id"]
"#;

    #[test]
    fn test_parse_with_graphql_section() {
        let file = ModelFile::parse(BLOG_MODEL).unwrap();
        assert_eq!(file.graphql.max_depth, 10);
        assert_eq!(file.graphql.max_complexity, 500);
        assert_eq!(file.model.collections.len(), 2);
        assert_eq!(file.model.relations.len(), 1);
    }

    #[test]
    fn test_parse_without_graphql_section() {
        let file = ModelFile::parse("[[collections]]\nname = \"tag\"\n").unwrap();
        assert_eq!(file.graphql.node_id_field_name, "id");
        assert_eq!(file.model.collections.len(), 1);
    }

    #[test]
    fn test_invalid_graphql_section_is_rejected() {
        let err = ModelFile::parse("[graphql]\nmax_depth = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_depth"), "{err}");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelFile::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read model file"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blog.toml");
        std::fs::write(&path, BLOG_MODEL).unwrap();
        let file = ModelFile::load(&path).unwrap();
        assert!(file.into_synthesizer().is_ok());
    }
}
