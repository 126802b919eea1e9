use tracing::{debug, info};

use crate::error::PlaceError;
use crate::geocoder::GeocodeResult;
use crate::layers::{LayerSet, LayerSink, PointFeature};
use crate::records::{AddressRecord, LayerKind};

/// Per-layer counts from one placement pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placement {
    pub red: usize,
    pub blue: usize,
    pub other: usize,
}

impl Placement {
    pub fn total(&self) -> usize {
        self.red + self.blue + self.other
    }

    pub fn count(&self, kind: LayerKind) -> usize {
        match kind {
            LayerKind::Red => self.red,
            LayerKind::Blue => self.blue,
            LayerKind::Other => self.other,
        }
    }

    fn bump(&mut self, kind: LayerKind) {
        match kind {
            LayerKind::Red => self.red += 1,
            LayerKind::Blue => self.blue += 1,
            LayerKind::Other => self.other += 1,
        }
    }
}

/// Inserts result `i` into the layer chosen by record `i`, in input order.
///
/// Stops at the first result with a non-finite coordinate. Points inserted
/// before that stay in their layers.
pub fn place(
    records: &[AddressRecord],
    results: &[GeocodeResult],
    layers: &mut LayerSet,
) -> Result<Placement, PlaceError> {
    if records.len() != results.len() {
        return Err(PlaceError::LengthMismatch {
            records: records.len(),
            results: results.len(),
        });
    }

    let mut placement = Placement::default();
    for (index, (record, result)) in records.iter().zip(results).enumerate() {
        if !result.x.is_finite() || !result.y.is_finite() {
            return Err(PlaceError::InvalidCoordinate {
                index,
                x: result.x,
                y: result.y,
            });
        }

        let kind = record.layer();
        layers
            .layer_mut(kind)
            .insert(PointFeature::new(result.x, result.y, result.matched_address.clone()));
        placement.bump(kind);
        debug!(index, layer = %kind, address = %result.matched_address, "point placed");
    }

    info!(
        red = placement.red,
        blue = placement.blue,
        other = placement.other,
        "points placed"
    );
    Ok(placement)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(x: f64, y: f64, address: &str) -> GeocodeResult {
        GeocodeResult {
            x,
            y,
            matched_address: address.to_string(),
        }
    }

    #[test]
    fn places_each_result_by_record_type() {
        let records = vec![
            AddressRecord::new("1 Main St", "red"),
            AddressRecord::new("2 Oak Ave", "blue"),
            AddressRecord::new("3 Pine Rd", "x"),
        ];
        let results = vec![
            result(1.0, 1.0, "1 MAIN ST"),
            result(2.0, 2.0, "2 OAK AVE"),
            result(3.0, 3.0, "3 PINE RD"),
        ];
        let mut layers = LayerSet::new();

        let placement = place(&records, &results, &mut layers).unwrap();

        assert_eq!(placement, Placement { red: 1, blue: 1, other: 1 });
        assert_eq!(
            layers.layer(LayerKind::Blue).features()[0].feature,
            PointFeature::new(2.0, 2.0, "2 OAK AVE")
        );
    }

    #[test]
    fn bad_coordinate_keeps_earlier_points() {
        let records = vec![
            AddressRecord::new("1 Main St", "red"),
            AddressRecord::new("2 Oak Ave", "red"),
            AddressRecord::new("3 Pine Rd", "red"),
        ];
        let results = vec![
            result(1.0, 1.0, "1 MAIN ST"),
            result(f64::NAN, 2.0, "2 OAK AVE"),
            result(3.0, 3.0, "3 PINE RD"),
        ];
        let mut layers = LayerSet::new();

        let err = place(&records, &results, &mut layers).unwrap_err();

        assert!(matches!(err, PlaceError::InvalidCoordinate { index: 1, .. }));
        assert_eq!(layers.layer(LayerKind::Red).len(), 1);
        assert_eq!(layers.total(), 1);
    }

    #[test]
    fn misaligned_inputs_place_nothing() {
        let records = vec![AddressRecord::new("1 Main St", "red")];
        let mut layers = LayerSet::new();

        let err = place(&records, &[], &mut layers).unwrap_err();

        assert!(matches!(
            err,
            PlaceError::LengthMismatch { records: 1, results: 0 }
        ));
        assert_eq!(layers.total(), 0);
    }
}
