use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::Table;
use pinmap_core::layers::LayerSet;
use pinmap_core::pipeline::RunSummary;
use pinmap_core::{AddressRecord, LayerKind};

pub fn layer_file_name(kind: LayerKind) -> String {
    format!("{}.geojson", kind.code())
}

/// Writes each layer as `<out_dir>/<layer>.geojson`, empty layers included.
pub async fn write_layers(layers: &LayerSet, out_dir: &Path) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(LayerKind::ALL.len());
    for layer in layers.iter() {
        let path = out_dir.join(layer_file_name(layer.kind()));
        let bytes = serde_json::to_vec_pretty(&layer.to_geojson())
            .with_context(|| format!("failed to serialize {}", layer.title()))?;
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

pub fn summary_table(layers: &LayerSet, summary: &RunSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Layer", "Marker", "Placed this run", "Total"]);
    for layer in layers.iter() {
        let kind = layer.kind();
        table.add_row(vec![
            layer.title().to_string(),
            kind.marker_color().to_string(),
            summary.placement.count(kind).to_string(),
            layer.len().to_string(),
        ]);
    }
    table
}

pub fn records_table(records: &[AddressRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Name", "Address", "Type", "Layer"]);
    for (index, record) in records.iter().enumerate() {
        table.add_row(vec![
            index.to_string(),
            record.name.clone().unwrap_or_default(),
            record.address.clone(),
            record.kind.clone().unwrap_or_else(|| "-".to_string()),
            record.layer().title().to_string(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use pinmap_core::layers::{LayerSink, PointFeature};
    use pinmap_core::placer::Placement;

    use super::*;

    #[test]
    fn layer_files_are_named_by_code() {
        assert_eq!(layer_file_name(LayerKind::Red), "red.geojson");
        assert_eq!(layer_file_name(LayerKind::Other), "other.geojson");
    }

    #[test]
    fn summary_lists_every_layer() {
        let mut layers = LayerSet::new();
        layers
            .layer_mut(LayerKind::Red)
            .insert(PointFeature::new(1.0, 2.0, "1 Main St"));
        let summary = RunSummary {
            records: 1,
            placement: Placement {
                red: 1,
                blue: 0,
                other: 0,
            },
        };

        let rendered = summary_table(&layers, &summary).to_string();

        assert!(rendered.contains("Red Layer"));
        assert!(rendered.contains("Blue Layer"));
        assert!(rendered.contains("Green Layer"));
        assert!(rendered.contains("teal"));
    }

    #[test]
    fn records_table_shows_missing_type() {
        let record = AddressRecord {
            address: "4 Elm Ct".to_string(),
            kind: None,
            name: None,
            phone: None,
            email: None,
        };

        let rendered = records_table(&[record]).to_string();

        assert!(rendered.contains("4 Elm Ct"));
        assert!(rendered.contains("Green Layer"));
    }

    #[tokio::test]
    async fn writes_one_file_per_layer() -> Result<()> {
        let out_dir = std::env::temp_dir().join(format!("pinmap-export-{}", std::process::id()));
        let mut layers = LayerSet::new();
        layers
            .layer_mut(LayerKind::Blue)
            .insert(PointFeature::new(-121.6, 36.6, "2 Oak Ave"));

        let written = write_layers(&layers, &out_dir).await?;

        assert_eq!(written.len(), 3);
        let blue: serde_json::Value =
            serde_json::from_slice(&std::fs::read(out_dir.join("blue.geojson"))?)?;
        assert_eq!(blue["type"], "FeatureCollection");
        assert_eq!(blue["features"][0]["properties"]["address"], "2 Oak Ave");
        assert_eq!(blue["title"], "Blue Layer");

        std::fs::remove_dir_all(&out_dir)?;
        Ok(())
    }
}
