use schemars::{
    gen::SchemaGenerator,
    schema::{InstanceType, Schema, SchemaObject},
    JsonSchema,
};
use serde::{Serialize, Serializer};
use utility::geo::great_circle_distance_km;

use crate::{row::Row, WithId};

/// Displayed in place of a distance that can not be computed.
pub const UNAVAILABLE: &str = "—";

/// Distance shown in the kilometer column of a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kilometer {
    Distance(f64),
    Unavailable,
}

impl Kilometer {
    pub fn value(&self) -> Option<f64> {
        match self {
            Kilometer::Distance(km) => Some(*km),
            Kilometer::Unavailable => None,
        }
    }
}

impl Serialize for Kilometer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.value() {
            Some(km) => serializer.serialize_f64(km),
            None => serializer.serialize_str(UNAVAILABLE),
        }
    }
}

impl JsonSchema for Kilometer {
    fn schema_name() -> String {
        "Kilometer".to_owned()
    }

    fn json_schema(_gen: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(
                vec![InstanceType::Number, InstanceType::String].into(),
            ),
            ..Default::default()
        }
        .into()
    }
}

/// A row together with its computed distances.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    #[serde(flatten)]
    pub row: WithId<Row>,
    pub kilometer: Kilometer,
    pub segment_distance: f64,
}

impl DisplayRow {
    fn new(row: &WithId<Row>, kilometer: Kilometer, segment_distance: f64) -> Self {
        Self {
            row: row.clone(),
            kilometer,
            segment_distance,
        }
    }

    fn unavailable(row: &WithId<Row>) -> Self {
        Self::new(row, Kilometer::Unavailable, 0.0)
    }
}

/// Running state of the cumulative mode.
struct Trace {
    origin: (f64, f64),
    previous: (f64, f64),
    total: f64,
}

impl Trace {
    fn new(origin: (f64, f64)) -> Self {
        Self {
            origin,
            previous: origin,
            total: 0.0,
        }
    }

    fn reset(&mut self) {
        self.previous = self.origin;
        self.total = 0.0;
    }

    /// Moves to `point`, returning the segment length and the new total.
    fn advance(&mut self, point: (f64, f64)) -> (f64, f64) {
        let segment = distance(self.previous, point);
        self.total += segment;
        self.previous = point;
        (segment, self.total)
    }
}

fn distance(from: (f64, f64), to: (f64, f64)) -> f64 {
    great_circle_distance_km(from.0, from.1, to.0, to.1)
}

/// Computes the kilometer column for an ordered row sequence.
///
/// Without active filters every row shows its direct distance from the
/// origin. With active filters the distances accumulate along the sequence,
/// starting at the origin and restarting whenever the origin row itself
/// appears. Rows without coordinates show [`UNAVAILABLE`] and are skipped by
/// the accumulation. If there is no origin, or it has no coordinates, no
/// distance is available at all.
pub fn annotate_distances(
    origin: Option<&Row>,
    ordered_rows: &[WithId<Row>],
    filters_active: bool,
) -> Vec<DisplayRow> {
    let Some(origin_point) = origin.and_then(|origin| origin.coordinates()) else {
        return ordered_rows.iter().map(DisplayRow::unavailable).collect();
    };

    let mut trace = Trace::new(origin_point);
    ordered_rows
        .iter()
        .map(|row| {
            if row.content.is_origin() {
                trace.reset();
                return DisplayRow::new(row, Kilometer::Distance(0.0), 0.0);
            }
            let Some(point) = row.content.coordinates() else {
                return DisplayRow::unavailable(row);
            };
            if filters_active {
                let (segment, total) = trace.advance(point);
                DisplayRow::new(row, Kilometer::Distance(total), segment)
            } else {
                let direct = distance(origin_point, point);
                DisplayRow::new(row, Kilometer::Distance(direct), direct)
            }
        })
        .collect()
}

/// Finds the origin row in a row collection.
pub fn find_origin(rows: &[WithId<Row>]) -> Option<&WithId<Row>> {
    rows.iter().find(|row| row.content.is_origin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::tests::{located, origin};
    use utility::id::Id;

    fn d(a: (f64, f64), b: (f64, f64)) -> f64 {
        great_circle_distance_km(a.0, a.1, b.0, b.1)
    }

    fn without_coordinates(id: &str) -> WithId<Row> {
        WithId::new(
            Id::new(id.to_owned()),
            Row {
                location: id.to_owned(),
                active: true,
                ..Default::default()
            },
        )
    }

    #[test]
    fn direct_mode_ignores_position() {
        let origin = origin(0.0, 0.0);
        let target = located("target", 0.0, 1.0);
        let rows = vec![
            located("far", 10.0, 10.0),
            located("near", 0.0, 0.5),
            target.clone(),
        ];
        let annotated = annotate_distances(Some(&origin.content), &rows, false);
        let expected = d((0.0, 0.0), (0.0, 1.0));
        assert_eq!(annotated[2].kilometer, Kilometer::Distance(expected));
        assert_eq!(annotated[2].segment_distance, expected);

        let alone = annotate_distances(Some(&origin.content), &[target], false);
        assert_eq!(alone[0].kilometer, Kilometer::Distance(expected));
    }

    #[test]
    fn cumulative_mode_sums_segments() {
        let origin = origin(0.0, 0.0);
        let rows = vec![located("a", 0.0, 1.0), located("b", 0.0, 2.0)];
        let annotated = annotate_distances(Some(&origin.content), &rows, true);

        let oa = d((0.0, 0.0), (0.0, 1.0));
        let ab = d((0.0, 1.0), (0.0, 2.0));
        assert_eq!(annotated[0].kilometer, Kilometer::Distance(oa));
        assert_eq!(annotated[0].segment_distance, oa);
        assert_eq!(annotated[1].kilometer, Kilometer::Distance(oa + ab));
        assert_eq!(annotated[1].segment_distance, ab);
    }

    #[test]
    fn missing_coordinates_do_not_disturb_the_trace() {
        let origin = origin(0.0, 0.0);
        let rows = vec![
            located("a", 0.0, 1.0),
            without_coordinates("gap"),
            located("b", 0.0, 2.0),
        ];
        let annotated = annotate_distances(Some(&origin.content), &rows, true);
        assert_eq!(annotated[1].kilometer, Kilometer::Unavailable);
        assert_eq!(annotated[1].segment_distance, 0.0);

        let oa = d((0.0, 0.0), (0.0, 1.0));
        let ab = d((0.0, 1.0), (0.0, 2.0));
        assert_eq!(annotated[2].kilometer, Kilometer::Distance(oa + ab));
        assert_eq!(annotated[2].segment_distance, ab);

        let direct = annotate_distances(Some(&origin.content), &rows, false);
        assert_eq!(direct[1].kilometer, Kilometer::Unavailable);
        assert_eq!(direct[1].segment_distance, 0.0);
    }

    #[test]
    fn origin_row_resets_the_trace() {
        let origin = origin(0.0, 0.0);
        let rows = vec![
            origin.clone(),
            located("a", 0.0, 1.0),
            origin.clone(),
            located("b", 0.0, 2.0),
        ];
        let annotated = annotate_distances(Some(&origin.content), &rows, true);
        assert_eq!(annotated[0].kilometer, Kilometer::Distance(0.0));
        assert_eq!(annotated[0].segment_distance, 0.0);
        assert_eq!(annotated[2].kilometer, Kilometer::Distance(0.0));
        assert_eq!(
            annotated[3].kilometer,
            Kilometer::Distance(d((0.0, 0.0), (0.0, 2.0)))
        );
    }

    #[test]
    fn no_origin_means_no_distances() {
        let rows = vec![located("a", 0.0, 1.0), located("b", 0.0, 2.0)];
        for filters_active in [false, true] {
            for annotated in [
                annotate_distances(None, &rows, filters_active),
                annotate_distances(
                    Some(&without_coordinates("QL Kitchen").content),
                    &rows,
                    filters_active,
                ),
            ] {
                assert!(annotated.iter().all(|row| {
                    row.kilometer == Kilometer::Unavailable && row.segment_distance == 0.0
                }));
            }
        }
    }

    #[test]
    fn invalid_origin_coordinates() {
        let mut origin = origin(0.0, 0.0);
        origin.content.latitude = Some("not a number".to_owned());
        let annotated =
            annotate_distances(Some(&origin.content), &[located("a", 0.0, 1.0)], false);
        assert_eq!(annotated[0].kilometer, Kilometer::Unavailable);
    }

    #[test]
    fn rows_are_copied_unchanged() {
        let origin = origin(0.0, 0.0);
        let rows = vec![located("a", 0.0, 1.0)];
        let annotated = annotate_distances(Some(&origin.content), &rows, true);
        assert_eq!(annotated[0].row, rows[0]);
    }

    #[test]
    fn serializes_unavailable_as_dash() {
        let annotated = annotate_distances(None, &[located("a", 0.0, 1.0)], false);
        let json = serde_json::to_value(&annotated[0]).unwrap();
        assert_eq!(json["id"], "a");
        assert_eq!(json["kilometer"], "—");
        assert_eq!(json["segmentDistance"], 0.0);

        let origin = origin(0.0, 0.0);
        let annotated =
            annotate_distances(Some(&origin.content), &[located("a", 0.0, 1.0)], false);
        let json = serde_json::to_value(&annotated[0]).unwrap();
        assert!(json["kilometer"].as_f64().unwrap() > 111.0);
    }

    #[test]
    fn finds_origin() {
        let rows = vec![located("a", 0.0, 1.0), origin(1.0, 1.0)];
        assert_eq!(find_origin(&rows).unwrap().id.raw(), "origin");
        assert!(find_origin(&rows[..1]).is_none());
    }
}
