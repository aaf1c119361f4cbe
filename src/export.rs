use anyhow::Result;

use crate::types::ProjectionPoint;

/// Render the compounding projection as `Day,Balance` CSV text.
pub fn projection_csv(projection: &[ProjectionPoint]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Day", "Balance"])?;

    for point in projection {
        writer.write_record([point.day.to_string(), point.balance.to_string()])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_csv_layout() {
        let projection = vec![
            ProjectionPoint {
                day: 0,
                balance: 1000.0,
            },
            ProjectionPoint {
                day: 1,
                balance: 1010.0,
            },
            ProjectionPoint {
                day: 2,
                balance: 1020.1,
            },
        ];
        let csv = projection_csv(&projection).unwrap();
        assert_eq!(csv, "Day,Balance\n0,1000\n1,1010\n2,1020.1\n");
    }

    #[test]
    fn test_empty_projection_keeps_header() {
        let csv = projection_csv(&[]).unwrap();
        assert_eq!(csv, "Day,Balance\n");
    }
}
