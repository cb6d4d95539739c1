//! rust-exstruct: relational schema synthesis for extracted document entity types
//!
//! This library takes the entity types extracted from hierarchical documents
//! (XML/JSON) and compiles them into a relational schema description:
//! primary tables, archive mirrors, many-to-many association tables,
//! external id triggers and truncate-time archival triggers. Rendering the
//! description to SQL is a separate step.

pub mod archive;
pub mod config;
pub mod descriptor;
pub mod emitter;
pub mod error;
pub mod external_id;
pub mod model;
pub mod naming;
pub mod relations;
pub mod render;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

pub use config::GeneratorConfig;
pub use error::ExstructError;
pub use render::OutputFormat;

/// Shape of the model file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// `{"entity_types": [...]}` schema model
    #[default]
    Model,
    /// Nested collected-info mapping from document extraction
    Mapping,
}

impl std::str::FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "model" => Ok(InputFormat::Model),
            "mapping" => Ok(InputFormat::Mapping),
            _ => Err(format!("Unknown input format: {}", s)),
        }
    }
}

/// Options for generating a schema
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Path to the model or mapping file
    pub model_path: PathBuf,
    pub input_format: InputFormat,
    /// Output path (defaults to `<model dir>/<schema>_schema.<ext>`)
    pub output_path: Option<PathBuf>,
    pub output_format: OutputFormat,
    pub config: GeneratorConfig,
}

/// Load the schema model in the given input format
pub fn load_schema_model(
    path: &Path,
    input_format: InputFormat,
    config: &GeneratorConfig,
) -> Result<model::SchemaModel> {
    let model = match input_format {
        InputFormat::Model => model::load_model(path)?,
        InputFormat::Mapping => model::load_mapping(path, &config.mapping_delimiter)?,
    };
    Ok(model)
}

/// Generate a schema from a model file and write the rendered output
pub fn generate_schema(options: GenerateOptions) -> Result<PathBuf> {
    info!(model = %options.model_path.display(), "Generating schema");

    // Step 1: Load the schema model
    let model = load_schema_model(&options.model_path, options.input_format, &options.config)?;
    info!(entity_types = model.len(), "Loaded schema model");

    // Step 2: Build the schema description
    let description = emitter::emit_schema(&model, &options.config)?;

    // Step 3: Render into memory so a failure leaves no partial file behind
    let mut buffer = Vec::with_capacity(description.entities.len() * 2048);
    options.output_format.render(&mut buffer, &description)?;

    // Step 4: Determine output path
    let output_path = options.output_path.unwrap_or_else(|| {
        let model_dir = options
            .model_path
            .parent()
            .unwrap_or(Path::new("."));
        model_dir.join(format!(
            "{}_schema.{}",
            options.config.schema,
            options.output_format.extension()
        ))
    });

    // Step 5: Write the output
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExstructError::OutputWriteError {
            path: output_path.clone(),
            source: e,
        })?;
    }
    std::fs::write(&output_path, &buffer).map_err(|e| ExstructError::OutputWriteError {
        path: output_path.clone(),
        source: e,
    })?;

    info!(output = %output_path.display(), "Wrote schema");
    Ok(output_path)
}
