use crate::error::Result;
use crate::models::StationInfo;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::Path;

/// The Station Reference Table: static geodetic metadata per station code.
/// Loaded once from a delimited text export and consulted by the ledger
/// during reconciliation.
#[derive(Debug, Clone, Default)]
pub struct StationTable {
    entries: HashMap<String, StationInfo>,
}

impl StationTable {
    pub fn insert(&mut self, code: &str, info: StationInfo) {
        self.entries.insert(normalize_code(code), info);
    }

    /// Lookup is case-insensitive; directory names and table codes match
    /// regardless of input casing.
    pub fn get(&self, code: &str) -> Option<&StationInfo> {
        self.entries.get(&normalize_code(code))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Uppercases and trims a station code before any lookup or storage.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Loads the reference table from a delimited text file.
///
/// The exports this tool sees come from French-locale spreadsheets, so the
/// loader sniffs `;` vs `,` delimiters and accepts decimal commas in the
/// numeric columns. A row with an unparsable number keeps its station with
/// that field absent; only the code column is mandatory.
pub fn load_station_table(path: &Path) -> Result<StationTable> {
    let data = std::fs::read_to_string(path)?;
    let delimiter = sniff_delimiter(&data);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers);

    let mut table = StationTable::default();
    for record in reader.records() {
        let record = record?;
        let code = match columns.code.and_then(|i| record.get(i)) {
            Some(code) if !code.trim().is_empty() => normalize_code(code),
            _ => continue,
        };

        let info = StationInfo {
            commune: columns
                .commune
                .and_then(|i| record.get(i))
                .unwrap_or_default()
                .to_string(),
            latitude: columns.latitude.and_then(|i| parse_locale_float(record.get(i))),
            longitude: columns.longitude.and_then(|i| parse_locale_float(record.get(i))),
            reference_elevation: columns
                .reference_elevation
                .and_then(|i| parse_locale_float(record.get(i))),
            phma: columns.phma.and_then(|i| parse_locale_float(record.get(i))),
            pmve: columns.pmve.and_then(|i| parse_locale_float(record.get(i))),
            pmme: columns.pmme.and_then(|i| parse_locale_float(record.get(i))),
            nm: columns.nm.and_then(|i| parse_locale_float(record.get(i))),
        };
        table.entries.insert(code, info);
    }

    log::info!(
        "Loaded {} stations from reference table {}",
        table.len(),
        path.display()
    );
    Ok(table)
}

/// Column positions resolved from the header row. The compact export uses
/// `Station`, the extended one `Nom CD50`; tide datum headers carry a
/// `(m NGF)` suffix, so they are matched by prefix.
#[derive(Debug, Default)]
struct ColumnMap {
    code: Option<usize>,
    commune: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
    reference_elevation: Option<usize>,
    phma: Option<usize>,
    pmve: Option<usize>,
    pmme: Option<usize>,
    nm: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut columns = Self::default();
        for (idx, raw) in headers.iter().enumerate() {
            let name = raw.trim();
            let upper = name.to_uppercase();
            if upper == "STATION" || upper == "NOM CD50" {
                columns.code = Some(idx);
            } else if upper == "COMMUNE" {
                columns.commune = Some(idx);
            } else if upper == "LATITUDE" {
                columns.latitude = Some(idx);
            } else if upper == "LONGITUDE" {
                columns.longitude = Some(idx);
            } else if upper == "Z_CC49" {
                columns.reference_elevation = Some(idx);
            } else if upper.starts_with("PHMA") {
                columns.phma = Some(idx);
            } else if upper.starts_with("PMVE") {
                columns.pmve = Some(idx);
            } else if upper.starts_with("PMME") {
                columns.pmme = Some(idx);
            } else if upper == "NM" || upper.starts_with("NM ") || upper.starts_with("NM(") {
                columns.nm = Some(idx);
            }
        }
        columns
    }
}

fn sniff_delimiter(data: &str) -> u8 {
    let header = data.lines().next().unwrap_or_default();
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons >= commas {
        b';'
    } else {
        b','
    }
}

fn parse_locale_float(field: Option<&str>) -> Option<f64> {
    let field = field?.trim();
    if field.is_empty() {
        return None;
    }
    field.replace(',', ".").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_semicolon_file_with_decimal_commas() {
        let path = write_temp(
            "sl_stations_semicolon.csv",
            "Station;Commune;Latitude;Longitude;Z_CC49\n\
             sw47;Genets;48,6862;-1,4891;6,85\n\
             SX02;Dragey-Ronthon;48,7015;-1,5023;7,12\n",
        );
        let table = load_station_table(&path).unwrap();
        assert_eq!(table.len(), 2);

        let info = table.get("SW47").unwrap();
        assert_eq!(info.commune, "Genets");
        assert!((info.latitude.unwrap() - 48.6862).abs() < 1e-9);
        assert!((info.reference_elevation.unwrap() - 6.85).abs() < 1e-9);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let path = write_temp(
            "sl_stations_case.csv",
            "Station;Commune;Latitude;Longitude;Z_CC49\nSW47;Genets;48,7;-1,5;6,85\n",
        );
        let table = load_station_table(&path).unwrap();
        assert!(table.get("sw47").is_some());
        assert!(table.get(" SW47 ").is_some());
        assert!(table.get("SX99").is_none());
    }

    #[test]
    fn loads_comma_file_with_decimal_points() {
        let path = write_temp(
            "sl_stations_comma.csv",
            "Station,Commune,Latitude,Longitude,Z_CC49\nSW47,Genets,48.6862,-1.4891,6.85\n",
        );
        let table = load_station_table(&path).unwrap();
        let info = table.get("SW47").unwrap();
        assert!((info.longitude.unwrap() + 1.4891).abs() < 1e-9);
    }

    #[test]
    fn extended_layout_fills_tide_datums() {
        let path = write_temp(
            "sl_stations_extended.csv",
            "Nom CD50;Commune;Z_CC49;PHMA (m NGF);PMVE (m NGF);PMME (m NGF);NM (m NGF)\n\
             SW47;Genets;6,85;7,45;6,60;4,05;0,64\n",
        );
        let table = load_station_table(&path).unwrap();
        let info = table.get("SW47").unwrap();
        assert!((info.phma.unwrap() - 7.45).abs() < 1e-9);
        assert!((info.nm.unwrap() - 0.64).abs() < 1e-9);
        assert!(info.latitude.is_none());
    }

    #[test]
    fn unparsable_number_keeps_station_without_field() {
        let path = write_temp(
            "sl_stations_badnum.csv",
            "Station;Commune;Latitude;Longitude;Z_CC49\nSW47;Genets;n/a;-1,4891;6,85\n",
        );
        let table = load_station_table(&path).unwrap();
        let info = table.get("SW47").unwrap();
        assert!(info.latitude.is_none());
        assert!(info.longitude.is_some());
    }

    #[test]
    fn blank_code_rows_are_skipped() {
        let path = write_temp(
            "sl_stations_blank.csv",
            "Station;Commune;Latitude;Longitude;Z_CC49\n;Genets;48,7;-1,5;6,85\nSW47;Genets;48,7;-1,5;6,85\n",
        );
        let table = load_station_table(&path).unwrap();
        assert_eq!(table.len(), 1);
    }
}
