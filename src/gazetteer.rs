use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One known data-center facility with its display geography.
///
/// `key` is the canonical uppercase facility name and is unique within the
/// gazetteer; it serializes as `name` in the snapshot's `locations` array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationEntry {
    #[serde(rename = "name")]
    pub key: String,
    pub city: String,
    pub region: String,
    pub lat: f64,
    pub lng: f64,
}

/// Ordered set of known facilities plus an exact-match index.
///
/// Declaration order is part of the data, not the algorithm: substring
/// resolution scans entries in order and the first match wins, so reordering
/// entries changes which facility an ambiguous input lands on. Append new
/// facilities at the end.
pub struct Gazetteer {
    entries: Vec<LocationEntry>,
    by_key: HashMap<String, usize>,
}

static BUILTIN: Lazy<Gazetteer> = Lazy::new(Gazetteer::builtin);

impl Gazetteer {
    /// The process-wide gazetteer of NCIX data-center facilities.
    pub fn global() -> &'static Gazetteer {
        &BUILTIN
    }

    fn builtin() -> Self {
        fn entry(key: &str, city: &str, region: &str, lat: f64, lng: f64) -> LocationEntry {
            LocationEntry {
                key: key.to_string(),
                city: city.to_string(),
                region: region.to_string(),
                lat,
                lng,
            }
        }

        Self::from_entries(vec![
            entry("JAKARTA KARET TENGSIN", "Jakarta", "DKI Jakarta", -6.1944, 106.8229),
            entry("JAKARTA JATINEGARA", "Jakarta", "DKI Jakarta", -6.2146, 106.8707),
            entry("JAKARTA MERUYA", "Jakarta", "DKI Jakarta", -6.1951, 106.7328),
            entry("SURABAYA GUBENG", "Surabaya", "Jawa Timur", -7.2651, 112.7524),
            entry("SURABAYA KEBALEN", "Surabaya", "Jawa Timur", -7.2775, 112.7391),
            entry("BANDUNG LEMBONG", "Bandung", "Jawa Barat", -6.9175, 107.6191),
            entry("SEMARANG CANDI", "Semarang", "Jawa Tengah", -7.0051, 110.4381),
            entry("YOGYAKARTA KOTABARU", "Yogyakarta", "DI Yogyakarta", -7.7956, 110.3695),
            entry("MEDAN CENTRUM", "Medan", "Sumatera Utara", 3.5952, 98.6722),
            entry("PALEMBANG TALANG KALAPA", "Palembang", "Sumatera Selatan", -2.9761, 104.7754),
            entry("PEKANBARU CENTRUM", "Pekanbaru", "Riau", 0.5071, 101.4478),
            entry("LAMPUNG TANJUNG KARANG", "Bandar Lampung", "Lampung", -5.4291, 105.2619),
            entry("DENPASAR KALIASEM", "Denpasar", "Bali", -8.6705, 115.2126),
            entry("MAKASSAR MATOANGIN", "Makassar", "Sulawesi Selatan", -5.1477, 119.4327),
            entry("MANADO PANIKI", "Manado", "Sulawesi Utara", 1.4748, 124.8421),
            entry("BALIKPAPAN BATUAMPAR", "Balikpapan", "Kalimantan Timur", -1.2379, 116.8529),
            entry("BANJARMASIN ULIN", "Banjarmasin", "Kalimantan Selatan", -3.3194, 114.5906),
            entry("PONTIANAK CENTRUM", "Pontianak", "Kalimantan Barat", -0.0263, 109.3425),
            entry("BATAM CENTRE", "Batam", "Kepulauan Riau", 1.1303, 104.0533),
            entry("ACEH CENTRUM", "Banda Aceh", "Aceh", 5.5577, 95.3222),
            entry("MALANG", "Malang", "Jawa Timur", -7.9666, 112.6326),
            entry("CIREBON", "Cirebon", "Jawa Barat", -6.7063, 108.557),
            entry("PUGERAN YOGYAKARTA", "Yogyakarta", "DI Yogyakarta", -7.7956, 110.3695),
            entry("BATAM CENTRE LT 4", "Batam", "Kepulauan Riau", 1.1303, 104.0533),
            entry("BATAM BUKITDANGAS", "Batam", "Kepulauan Riau", 1.1303, 104.0533),
            entry("SEMARANG BANYUMANIK", "Semarang", "Jawa Tengah", -7.0051, 110.4381),
        ])
    }

    fn from_entries(entries: Vec<LocationEntry>) -> Self {
        let mut by_key = HashMap::with_capacity(entries.len());
        for (idx, e) in entries.iter().enumerate() {
            by_key.entry(e.key.clone()).or_insert(idx);
        }
        Self { entries, by_key }
    }

    /// Resolve a raw location string to a gazetteer entry.
    ///
    /// The input is trimmed and uppercased. An exact key match is checked
    /// first (the common case, and the only way an entry whose key contains
    /// another key can win). Otherwise entries are scanned in declaration
    /// order and the first one wins where either string contains the other.
    /// Returns `None` for blank input or when nothing matches.
    pub fn resolve(&self, raw_location: &str) -> Option<&LocationEntry> {
        let normalized = raw_location.trim().to_uppercase();
        if normalized.is_empty() {
            return None;
        }

        if let Some(&idx) = self.by_key.get(&normalized) {
            return Some(&self.entries[idx]);
        }

        self.entries
            .iter()
            .find(|e| normalized.contains(e.key.as_str()) || e.key.contains(normalized.as_str()))
    }

    /// Look up an entry by its canonical key.
    pub fn get(&self, key: &str) -> Option<&LocationEntry> {
        self.by_key.get(key).map(|&idx| &self.entries[idx])
    }

    /// All entries in declaration order.
    pub fn entries(&self) -> &[LocationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_unique() {
        let g = Gazetteer::global();
        let keys: HashSet<&str> = g.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys.len(), g.len());
    }

    #[test]
    fn test_exact_match_beats_substring() {
        // "BATAM CENTRE" is a substring of this key; the exact index must win
        // before any ordered scan happens.
        let g = Gazetteer::global();
        let entry = g.resolve("BATAM CENTRE LT 4").unwrap();
        assert_eq!(entry.key, "BATAM CENTRE LT 4");
    }

    #[test]
    fn test_every_key_resolves_to_itself() {
        let g = Gazetteer::global();
        for e in g.entries() {
            let resolved = g.resolve(&e.key).unwrap();
            assert_eq!(resolved.key, e.key, "key {} did not resolve to itself", e.key);
        }
    }

    #[test]
    fn test_substring_pairs_are_frozen() {
        // Precedence between keys where one contains the other depends on
        // declaration order. Enumerate those pairs so a data edit that adds
        // or reorders an overlapping key fails loudly here.
        let g = Gazetteer::global();
        let mut pairs = Vec::new();
        for a in g.entries() {
            for b in g.entries() {
                if a.key != b.key && b.key.contains(a.key.as_str()) {
                    pairs.push((a.key.clone(), b.key.clone()));
                }
            }
        }
        assert_eq!(
            pairs,
            vec![("BATAM CENTRE".to_string(), "BATAM CENTRE LT 4".to_string())]
        );

        // The shorter key of the only overlapping pair resolves to itself.
        assert_eq!(g.resolve("BATAM CENTRE").unwrap().key, "BATAM CENTRE");
        // A qualified variant that is not itself a key falls back to the
        // first declared containing match.
        assert_eq!(g.resolve("BATAM CENTRE LT 5").unwrap().key, "BATAM CENTRE");
        assert_eq!(g.resolve("BATAM").unwrap().key, "BATAM CENTRE");
    }

    #[test]
    fn test_resolve_normalizes_case_and_whitespace() {
        let g = Gazetteer::global();
        let entry = g.resolve("  jakarta meruya ").unwrap();
        assert_eq!(entry.key, "JAKARTA MERUYA");
        assert_eq!(entry.city, "Jakarta");
        assert_eq!(entry.region, "DKI Jakarta");
    }

    #[test]
    fn test_resolve_matches_in_both_directions() {
        let g = Gazetteer::global();
        // Input contains a key.
        assert_eq!(
            g.resolve("NCIX JAKARTA MERUYA FLOOR 2").unwrap().key,
            "JAKARTA MERUYA"
        );
        // A key contains the input.
        assert_eq!(g.resolve("MERUYA").unwrap().key, "JAKARTA MERUYA");
    }

    #[test]
    fn test_resolve_rejects_blank_and_unknown() {
        let g = Gazetteer::global();
        assert!(g.resolve("").is_none());
        assert!(g.resolve("   ").is_none());
        assert!(g.resolve("UNKNOWN PLACE").is_none());
    }
}
