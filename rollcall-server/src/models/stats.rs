//! Dashboard aggregation

use serde::{Deserialize, Serialize};

/// Counts derived from the current collection state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: i64,
    pub active_students: i64,
    pub graduated_students: i64,
    pub total_courses: i64,
    pub active_courses: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_camel_case_shape() {
        let stats = DashboardStats {
            total_students: 3,
            active_students: 2,
            graduated_students: 1,
            total_courses: 4,
            active_courses: 3,
        };
        assert_eq!(
            serde_json::to_value(stats).unwrap(),
            serde_json::json!({
                "totalStudents": 3,
                "activeStudents": 2,
                "graduatedStudents": 1,
                "totalCourses": 4,
                "activeCourses": 3
            })
        );
    }
}
