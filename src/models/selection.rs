//! In-memory narrowing and ranking of already fetched vacancies.

use super::Vacancy;
use crate::error::{Error, Result};
use std::cmp::Reverse;
use std::str::FromStr;

/// Inclusive salary bounds, written as `"100000-150000"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalaryRange {
    pub min: u64,
    pub max: u64,
}

impl FromStr for SalaryRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let (min, max) = compact
            .split_once('-')
            .ok_or_else(|| Error::InvalidQuery(format!("salary range '{}' is not MIN-MAX", s)))?;
        let parse = |part: &str| {
            part.parse::<u64>()
                .map_err(|_| Error::InvalidQuery(format!("salary range '{}' is not numeric", s)))
        };
        let range = SalaryRange {
            min: parse(min)?,
            max: parse(max)?,
        };
        if range.min > range.max {
            return Err(Error::InvalidQuery(format!(
                "salary range '{}' has min above max",
                s
            )));
        }
        Ok(range)
    }
}

pub fn filter_by_keywords<S: AsRef<str>>(vacancies: Vec<Vacancy>, keywords: &[S]) -> Vec<Vacancy> {
    vacancies
        .into_iter()
        .filter(|v| v.contains_keywords(keywords))
        .collect()
}

pub fn filter_by_salary(vacancies: Vec<Vacancy>, range: SalaryRange) -> Vec<Vacancy> {
    vacancies
        .into_iter()
        .filter(|v| v.salary_in_range(range.min, range.max))
        .collect()
}

/// Highest pay first; listings without salary go last, ties keep their order.
pub fn sort_by_salary(mut vacancies: Vec<Vacancy>) -> Vec<Vacancy> {
    vacancies.sort_by_key(|v| Reverse(v.salary_floor()));
    vacancies
}

pub fn top(mut vacancies: Vec<Vacancy>, n: usize) -> Vec<Vacancy> {
    vacancies.truncate(n);
    vacancies
}
