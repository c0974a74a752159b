//! Pure views derived from one employee listing.

use crate::{error::DirectoryError, model::Employee};

pub const TOP_EARNERS_LIMIT: usize = 10;

/// Employees whose name contains `fragment`, ignoring case, in listing order.
/// Records without a name never match, not even the empty fragment.
pub fn filter_by_name(employees: Vec<Employee>, fragment: &str) -> Vec<Employee> {
    let needle = fragment.to_lowercase();
    employees
        .into_iter()
        .filter(|employee| {
            employee
                .name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Maximum salary in the listing, `0` for an empty listing.
pub fn highest_salary(employees: &[Employee]) -> Result<i64, DirectoryError> {
    let mut highest = None;
    for employee in employees {
        let salary = salary_of(employee)?;
        highest = Some(highest.map_or(salary, |current: i64| current.max(salary)));
    }
    Ok(highest.unwrap_or(0))
}

/// Names of the `limit` best paid employees, highest salary first.
///
/// Ties keep their listing order. A top earner without a name yields `None`.
pub fn top_earners(
    employees: Vec<Employee>,
    limit: usize,
) -> Result<Vec<Option<String>>, DirectoryError> {
    let mut ranked = employees
        .into_iter()
        .map(|employee| salary_of(&employee).map(|salary| (salary, employee.name)))
        .collect::<Result<Vec<_>, _>>()?;
    // `sort_by` is stable, so ties keep their listing order.
    ranked.sort_by(|(left, _), (right, _)| right.cmp(left));
    Ok(ranked
        .into_iter()
        .take(limit)
        .map(|(_, name)| name)
        .collect())
}

fn salary_of(employee: &Employee) -> Result<i64, DirectoryError> {
    employee.salary.ok_or_else(|| DirectoryError::MissingSalary {
        id: employee.id.clone(),
    })
}
