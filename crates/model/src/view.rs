use chrono::Weekday;
use indexmap::IndexSet;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::Id;

use crate::{
    distance::{annotate_distances, find_origin, DisplayRow},
    ordering::{sort_by_code, DayNotice, OrderingPolicy},
    row::Row,
    WithId,
};

/// Interactive filters of a table view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RowQuery {
    /// Case-insensitive free text, matched against every field.
    pub search: String,
    /// Only rows on one of these routes are kept. Empty keeps all.
    pub routes: Vec<String>,
    /// Rows with one of these delivery labels are hidden.
    pub hidden_deliveries: Vec<String>,
}

impl RowQuery {
    /// Whether any filter is set. Distances accumulate along the rows while
    /// a filter is active.
    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || !self.routes.is_empty() || !self.hidden_deliveries.is_empty()
    }

    pub fn matches(&self, row: &WithId<Row>) -> bool {
        self.matches_route(row) && self.matches_search(row) && self.matches_delivery(row)
    }

    fn matches_route(&self, row: &WithId<Row>) -> bool {
        self.routes.is_empty() || self.routes.contains(&row.content.route)
    }

    fn matches_search(&self, row: &WithId<Row>) -> bool {
        self.search.is_empty() || row.matches_search(&self.search)
    }

    fn matches_delivery(&self, row: &WithId<Row>) -> bool {
        !self.hidden_deliveries.contains(&row.content.delivery)
    }

    pub fn filter(&self, rows: Vec<WithId<Row>>) -> Vec<WithId<Row>> {
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}

/// Everything needed to render a table.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub rows: Vec<DisplayRow>,
    pub delivery_options: Vec<String>,
    pub notice: DayNotice,
}

/// Distinct non-empty delivery labels, in order of first appearance.
pub fn delivery_options(rows: &[WithId<Row>]) -> Vec<String> {
    rows.iter()
        .map(|row| row.content.delivery.as_str())
        .filter(|delivery| !delivery.is_empty())
        .collect::<IndexSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// The main table: all rows ordered for `today`, filtered, then annotated.
pub fn table_view(
    all_rows: &[WithId<Row>],
    query: &RowQuery,
    today: Weekday,
    policy: &OrderingPolicy,
) -> TableView {
    let origin = find_origin(all_rows);
    let ordered = policy.order(all_rows, today);
    let filtered = query.filter(ordered);

    TableView {
        rows: annotate_distances(origin.map(|row| &row.content), &filtered, query.is_active()),
        delivery_options: delivery_options(all_rows),
        notice: DayNotice::for_day(today, policy),
    }
}

/// Adds the origin in front of a non-empty member list that lacks it.
pub fn with_origin(all_rows: &[WithId<Row>], members: Vec<WithId<Row>>) -> Vec<WithId<Row>> {
    if members.is_empty() || find_origin(&members).is_some() {
        return members;
    }
    match find_origin(all_rows) {
        Some(origin) => std::iter::once(origin.clone()).chain(members).collect(),
        None => members,
    }
}

/// A custom table as seen through its share link.
///
/// Inactive members are dropped before ordering. In preview mode
/// `temp_order` rearranges the annotated rows; ids it does not know are
/// skipped and rows it does not list are dropped, while the computed
/// distances are kept as they are.
pub fn custom_table_view(
    all_rows: &[WithId<Row>],
    members: Vec<WithId<Row>>,
    query: &RowQuery,
    today: Weekday,
    policy: &OrderingPolicy,
    temp_order: Option<&[Id<Row>]>,
) -> TableView {
    let members = with_origin(all_rows, members);
    let origin = find_origin(&members)
        .or_else(|| find_origin(all_rows))
        .cloned();
    let delivery_options = delivery_options(&members);

    let active = members
        .into_iter()
        .filter(|row| row.content.active)
        .collect::<Vec<_>>();
    let ordered = policy.order(&active, today);
    let filtered = query.filter(ordered);
    let annotated = annotate_distances(
        origin.as_ref().map(|row| &row.content),
        &filtered,
        query.is_active(),
    );

    TableView {
        rows: match temp_order {
            Some(order) if !order.is_empty() => apply_temp_order(annotated, order),
            _ => annotated,
        },
        delivery_options,
        notice: DayNotice::for_day(today, policy),
    }
}

/// Rearranges rows by id.
pub fn apply_temp_order(rows: Vec<DisplayRow>, order: &[Id<Row>]) -> Vec<DisplayRow> {
    order
        .iter()
        .filter_map(|id| rows.iter().find(|row| &row.row.id == id).cloned())
        .collect()
}

/// The row list offered when building a custom table: searched and
/// delivery-filtered, ordered by code.
pub fn selection_view(all_rows: &[WithId<Row>], query: &RowQuery) -> Vec<WithId<Row>> {
    let filtered = all_rows
        .iter()
        .filter(|row| query.matches_search(row) && query.matches_delivery(row))
        .cloned()
        .collect::<Vec<_>>();
    sort_by_code(&filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        distance::Kilometer,
        row::tests::{located, origin, row},
        row::DeliveryAlt,
    };

    fn ids(rows: &[DisplayRow]) -> Vec<String> {
        rows.iter().map(|row| row.row.id.raw()).collect()
    }

    fn sample() -> Vec<WithId<Row>> {
        let mut rows = vec![
            located("a", 0.0, 1.0),
            located("b", 0.0, 2.0),
            located("c", 0.0, 3.0),
            origin(0.0, 0.0),
        ];
        for (row, (code, route, delivery)) in rows.iter_mut().zip([
            ("3", "KL 1", "Daily"),
            ("1", "KL 2", "Weekday"),
            ("2", "KL 1", "Daily"),
            ("0", "HQ", ""),
        ]) {
            row.content.code = code.to_owned();
            row.content.route = route.to_owned();
            row.content.delivery = delivery.to_owned();
        }
        rows
    }

    #[test]
    fn query_activity() {
        assert!(!RowQuery::default().is_active());
        assert!(RowQuery {
            search: "x".to_owned(),
            ..Default::default()
        }
        .is_active());
        assert!(RowQuery {
            hidden_deliveries: vec!["Daily".to_owned()],
            ..Default::default()
        }
        .is_active());
    }

    #[test]
    fn unfiltered_view_uses_direct_distances() {
        let view = table_view(
            &sample(),
            &RowQuery::default(),
            Weekday::Mon,
            &OrderingPolicy::default(),
        );
        assert_eq!(ids(&view.rows), vec!["origin", "b", "c", "a"]);
        let c = &view.rows[2];
        assert_eq!(
            c.kilometer.value().unwrap(),
            utility::geo::great_circle_distance_km(0.0, 0.0, 0.0, 3.0)
        );
        assert_eq!(view.delivery_options, vec!["Daily", "Weekday"]);
        assert_eq!(view.notice.delivery_off, "Alt 2 (Monday)");
    }

    #[test]
    fn filtered_view_accumulates() {
        let query = RowQuery {
            routes: vec!["KL 1".to_owned()],
            ..Default::default()
        };
        let view = table_view(&sample(), &query, Weekday::Mon, &OrderingPolicy::default());
        assert_eq!(ids(&view.rows), vec!["c", "a"]);
        let d = |lon1, lon2| utility::geo::great_circle_distance_km(0.0, lon1, 0.0, lon2);
        assert_eq!(view.rows[0].kilometer, Kilometer::Distance(d(0.0, 3.0)));
        assert_eq!(
            view.rows[1].kilometer,
            Kilometer::Distance(d(0.0, 3.0) + d(3.0, 1.0))
        );
    }

    #[test]
    fn delivery_filter_hides_labels() {
        let query = RowQuery {
            hidden_deliveries: vec!["Daily".to_owned()],
            ..Default::default()
        };
        let view = table_view(&sample(), &query, Weekday::Tue, &OrderingPolicy::default());
        assert_eq!(ids(&view.rows), vec!["origin", "b"]);
    }

    #[test]
    fn custom_view_reinserts_origin_and_drops_inactive() {
        let all = sample();
        let mut members = vec![all[0].clone(), all[1].clone()];
        members[1].content.active = false;

        let view = custom_table_view(
            &all,
            members,
            &RowQuery::default(),
            Weekday::Wed,
            &OrderingPolicy::default(),
            None,
        );
        assert_eq!(ids(&view.rows), vec!["origin", "a"]);
        assert_eq!(view.rows[0].kilometer, Kilometer::Distance(0.0));
        assert_eq!(view.delivery_options, vec!["Daily", "Weekday"]);
    }

    #[test]
    fn empty_membership_stays_empty() {
        let view = custom_table_view(
            &sample(),
            Vec::new(),
            &RowQuery::default(),
            Weekday::Wed,
            &OrderingPolicy::default(),
            None,
        );
        assert!(view.rows.is_empty());
    }

    #[test]
    fn temp_order_rearranges_and_drops() {
        let all = sample();
        let members = all[..3].to_vec();
        let plain = custom_table_view(
            &all,
            members.clone(),
            &RowQuery::default(),
            Weekday::Wed,
            &OrderingPolicy::default(),
            None,
        );
        let order: Vec<Id<Row>> = ["a", "missing", "origin", "b"]
            .into_iter()
            .map(|id| Id::new(id.to_owned()))
            .collect();
        let preview = custom_table_view(
            &all,
            members,
            &RowQuery::default(),
            Weekday::Wed,
            &OrderingPolicy::default(),
            Some(order.as_slice()),
        );
        assert_eq!(ids(&preview.rows), vec!["a", "origin", "b"]);
        let distance_of = |rows: &[DisplayRow], id: &str| {
            rows.iter()
                .find(|row| row.row.id.raw() == id)
                .map(|row| row.kilometer)
        };
        assert_eq!(distance_of(&preview.rows, "a"), distance_of(&plain.rows, "a"));
    }

    #[test]
    fn selection_is_code_ordered() {
        let mut all = sample();
        all.push(row("z", "10", DeliveryAlt::Inactive));
        let query = RowQuery {
            hidden_deliveries: vec!["Weekday".to_owned()],
            routes: vec!["ignored".to_owned()],
            ..Default::default()
        };
        let selection = selection_view(&all, &query);
        let codes = selection
            .iter()
            .map(|row| row.content.code.as_str())
            .collect::<Vec<_>>();
        assert_eq!(codes, vec!["0", "2", "3", "10"]);
    }

    #[test]
    fn delivery_options_are_unique() {
        let mut all = sample();
        all.push(all[0].clone());
        assert_eq!(delivery_options(&all), vec!["Daily", "Weekday"]);
        assert!(delivery_options(&[]).is_empty());
    }
}
