//! Plain-text flight board rendering.

use std::fmt::Write as _;

use crate::flight::{Flight, FlightList, TrafficStatus};

/// Which side of the airport a board shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardKind {
    /// Outbound flights; the airport column is the destination.
    Departures,
    /// Inbound flights; the airport column is the origin.
    Arrivals,
}

impl BoardKind {
    fn title(self) -> &'static str {
        match self {
            Self::Departures => "DEPARTURES",
            Self::Arrivals => "ARRIVALS",
        }
    }

    fn airport_header(self) -> &'static str {
        match self {
            Self::Departures => "DESTINATION",
            Self::Arrivals => "ORIGIN",
        }
    }

    fn airport(self, flight: &Flight) -> &str {
        let airport = match self {
            Self::Departures => flight.destination.as_deref(),
            Self::Arrivals => flight.origin.as_deref(),
        };
        airport.or_else(|| flight.other_airport()).unwrap_or("-")
    }
}

/// Marker printed next to flights named in the traffic notice.
const AFFECTED_MARK: &str = "!";

/// Render a board with an optional traffic banner.
#[must_use]
pub fn render(kind: BoardKind, flights: &FlightList, traffic: Option<&TrafficStatus>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", kind.title());
    let _ = writeln!(out, "{}", "=".repeat(kind.title().len()));

    if let Some(traffic) = traffic {
        let _ = writeln!(out, "{}", render_traffic(traffic));
    }

    if flights.is_empty() {
        out.push_str("No flights to display\n");
        return out;
    }

    let headers = [
        "",
        "FLIGHT",
        "COMPANY",
        kind.airport_header(),
        "TIME",
        "GATE",
        "STATUS",
    ];
    let rows: Vec<[String; 7]> = flights
        .iter()
        .map(|flight| {
            let affected = traffic.is_some_and(|t| t.affects(&flight.flight_number));
            [
                if affected { AFFECTED_MARK } else { "" }.to_string(),
                flight.flight_number.clone(),
                flight.company.clone(),
                kind.airport(flight).to_string(),
                flight.display_time().unwrap_or("-").to_string(),
                flight.gate.clone().unwrap_or_else(|| "-".to_string()),
                flight.status.clone(),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_row(&mut out, &headers, &widths);
    for row in &rows {
        write_row(&mut out, row, &widths);
    }
    out
}

fn write_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}

/// One-line traffic banner, e.g. `[WARNING] Strike ... (affects AF101, AF201)`.
#[must_use]
pub fn render_traffic(traffic: &TrafficStatus) -> String {
    let level = traffic.severity.to_string().to_uppercase();
    let mut line = format!("[{level}] {}", traffic.message);
    if !traffic.affected_flights.is_empty() {
        let _ = write!(line, " (affects {})", traffic.affected_flights.join(", "));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::flight::Severity;

    #[test]
    fn test_empty_board() {
        let out = render(BoardKind::Arrivals, &FlightList::default(), None);
        assert!(out.starts_with("ARRIVALS\n"));
        assert!(out.contains("No flights to display"));
    }

    #[test]
    fn test_departure_board_columns() {
        let out = render(BoardKind::Departures, &fixtures::departures().unwrap(), None);
        let header = out.lines().nth(2).unwrap();
        assert!(header.contains("DESTINATION"));
        assert!(out.contains("LH202"));
        assert!(out.contains("Frankfurt"));
    }

    #[test]
    fn test_arrival_board_uses_origin() {
        let out = render(BoardKind::Arrivals, &fixtures::arrivals().unwrap(), None);
        assert!(out.contains("ORIGIN"));
        assert!(out.contains("Zurich"));
    }

    #[test]
    fn test_affected_flights_are_marked() {
        let traffic = fixtures::traffic_status();
        let out = render(
            BoardKind::Departures,
            &fixtures::departures().unwrap(),
            Some(&traffic),
        );
        let af101 = out
            .lines()
            .find(|l| l.contains("AF101") && l.contains("Paris"))
            .unwrap();
        assert!(af101.starts_with(AFFECTED_MARK));
        let lh202 = out.lines().find(|l| l.contains("LH202")).unwrap();
        assert!(!lh202.starts_with(AFFECTED_MARK));
        assert!(out.contains("[WARNING] Strike in France"));
    }

    #[test]
    fn test_estimated_time_preferred() {
        let out = render(BoardKind::Departures, &fixtures::departures().unwrap(), None);
        let ba303 = out.lines().find(|l| l.contains("BA303")).unwrap();
        assert!(ba303.contains("08:55"));
    }

    #[test]
    fn test_traffic_banner_without_flights() {
        let traffic = TrafficStatus {
            message: "Fog".to_string(),
            severity: Severity::Other("amber".to_string()),
            affected_flights: Vec::new(),
        };
        assert_eq!(render_traffic(&traffic), "[AMBER] Fog");
    }
}
