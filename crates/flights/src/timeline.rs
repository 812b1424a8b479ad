use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::Flight;

/// Group every flight (return legs included) by calendar date.
///
/// Undated flights collect under `None`, which sorts first; dates ascend and
/// flights keep their input order within a day.
pub fn group_by_date(flights: &[Flight]) -> BTreeMap<Option<NaiveDate>, Vec<&Flight>> {
    let mut days: BTreeMap<Option<NaiveDate>, Vec<&Flight>> = BTreeMap::new();
    for flight in flights {
        days.entry(flight.date).or_default().push(flight);
    }
    days
}
