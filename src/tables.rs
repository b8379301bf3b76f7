//! Fixed astrological enumerations and total metadata lookup.
//!
//! Five ordered tables (tithi, nakshatra, yoga, karana, rashi) map a cycle
//! position to a name and invariant attributes (ruling deity, planetary lord,
//! short meaning). Lookups by name are total: an unrecognized name yields the
//! `"Unknown"` sentinel for every attribute, never an error — callers treat
//! `"Unknown"` as "no data".

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementMeta {
    pub name: &'static str,
    pub deity: &'static str,
    pub lord: &'static str,
    pub meaning: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RashiMeta {
    pub name: &'static str,
    pub lord: &'static str,
    pub element: &'static str,
}

pub const UNKNOWN_ELEMENT: ElementMeta = ElementMeta {
    name: "Unknown",
    deity: "Unknown",
    lord: "Unknown",
    meaning: "Unknown",
};

pub const UNKNOWN_RASHI: RashiMeta = RashiMeta {
    name: "Unknown",
    lord: "Unknown",
    element: "Unknown",
};

// ---

/// The 14 shared tithi names plus the two paksha-closing ones. A lunar month
/// has 30 tithis: positions 0-13 and 15-28 reuse the shared names, position
/// 14 is Purnima (full moon) and 29 is Amavasya (new moon).
const TITHI: [ElementMeta; 16] = [
    ElementMeta { name: "Pratipada", deity: "Agni", lord: "Sun", meaning: "Beginnings" },
    ElementMeta { name: "Dwitiya", deity: "Brahma", lord: "Moon", meaning: "Foundations" },
    ElementMeta { name: "Tritiya", deity: "Gauri", lord: "Mars", meaning: "Strength" },
    ElementMeta { name: "Chaturthi", deity: "Ganesha", lord: "Mercury", meaning: "Removing obstacles" },
    ElementMeta { name: "Panchami", deity: "Sarpa", lord: "Jupiter", meaning: "Healing" },
    ElementMeta { name: "Shashthi", deity: "Kartikeya", lord: "Venus", meaning: "Victory" },
    ElementMeta { name: "Saptami", deity: "Surya", lord: "Saturn", meaning: "Vitality" },
    ElementMeta { name: "Ashtami", deity: "Shiva", lord: "Rahu", meaning: "Conflict" },
    ElementMeta { name: "Navami", deity: "Durga", lord: "Sun", meaning: "Courage" },
    ElementMeta { name: "Dashami", deity: "Yama", lord: "Moon", meaning: "Dharma" },
    ElementMeta { name: "Ekadashi", deity: "Vishwadeva", lord: "Mars", meaning: "Fasting and purification" },
    ElementMeta { name: "Dwadashi", deity: "Vishnu", lord: "Mercury", meaning: "Charity" },
    ElementMeta { name: "Trayodashi", deity: "Kamadeva", lord: "Jupiter", meaning: "Friendship" },
    ElementMeta { name: "Chaturdashi", deity: "Kali", lord: "Venus", meaning: "Fierce energy" },
    ElementMeta { name: "Purnima", deity: "Chandra", lord: "Moon", meaning: "Fulfilment" },
    ElementMeta { name: "Amavasya", deity: "Pitru", lord: "Saturn", meaning: "Ancestors and rest" },
];

/// The 27 lunar mansions with their planetary lords and presiding deities.
const NAKSHATRA: [ElementMeta; 27] = [
    ElementMeta { name: "Ashwini", deity: "Ashwini Kumaras", lord: "Ketu", meaning: "Swiftness" },
    ElementMeta { name: "Bharani", deity: "Yama", lord: "Venus", meaning: "Bearing" },
    ElementMeta { name: "Krittika", deity: "Agni", lord: "Sun", meaning: "Cutting" },
    ElementMeta { name: "Rohini", deity: "Brahma", lord: "Moon", meaning: "Growth" },
    ElementMeta { name: "Mrigashira", deity: "Soma", lord: "Mars", meaning: "Searching" },
    ElementMeta { name: "Ardra", deity: "Rudra", lord: "Rahu", meaning: "The storm" },
    ElementMeta { name: "Punarvasu", deity: "Aditi", lord: "Jupiter", meaning: "Renewal" },
    ElementMeta { name: "Pushya", deity: "Brihaspati", lord: "Saturn", meaning: "Nourishment" },
    ElementMeta { name: "Ashlesha", deity: "Naga", lord: "Mercury", meaning: "Embrace" },
    ElementMeta { name: "Magha", deity: "Pitru", lord: "Ketu", meaning: "The throne" },
    ElementMeta { name: "Purva Phalguni", deity: "Bhaga", lord: "Venus", meaning: "Enjoyment" },
    ElementMeta { name: "Uttara Phalguni", deity: "Aryaman", lord: "Sun", meaning: "Patronage" },
    ElementMeta { name: "Hasta", deity: "Savitar", lord: "Moon", meaning: "The hand" },
    ElementMeta { name: "Chitra", deity: "Vishvakarma", lord: "Mars", meaning: "The jewel" },
    ElementMeta { name: "Swati", deity: "Vayu", lord: "Rahu", meaning: "Independence" },
    ElementMeta { name: "Vishakha", deity: "Indragni", lord: "Jupiter", meaning: "Purpose" },
    ElementMeta { name: "Anuradha", deity: "Mitra", lord: "Saturn", meaning: "Devotion" },
    ElementMeta { name: "Jyeshtha", deity: "Indra", lord: "Mercury", meaning: "Seniority" },
    ElementMeta { name: "Mula", deity: "Nirriti", lord: "Ketu", meaning: "The root" },
    ElementMeta { name: "Purva Ashadha", deity: "Apas", lord: "Venus", meaning: "Invigoration" },
    ElementMeta { name: "Uttara Ashadha", deity: "Vishwadeva", lord: "Sun", meaning: "Later victory" },
    ElementMeta { name: "Shravana", deity: "Vishnu", lord: "Moon", meaning: "Listening" },
    ElementMeta { name: "Dhanishta", deity: "Vasu", lord: "Mars", meaning: "Wealth" },
    ElementMeta { name: "Shatabhisha", deity: "Varuna", lord: "Rahu", meaning: "A hundred healers" },
    ElementMeta { name: "Purva Bhadrapada", deity: "Ajaikapada", lord: "Jupiter", meaning: "Burning purification" },
    ElementMeta { name: "Uttara Bhadrapada", deity: "Ahirbudhnya", lord: "Saturn", meaning: "Depths" },
    ElementMeta { name: "Revati", deity: "Pushan", lord: "Mercury", meaning: "Prosperity" },
];

/// The 27 yogas (sun-moon longitude combinations).
const YOGA: [ElementMeta; 27] = [
    ElementMeta { name: "Vishkambha", deity: "Yama", lord: "Saturn", meaning: "Supported" },
    ElementMeta { name: "Priti", deity: "Vishnu", lord: "Mercury", meaning: "Fondness" },
    ElementMeta { name: "Ayushman", deity: "Chandra", lord: "Ketu", meaning: "Long life" },
    ElementMeta { name: "Saubhagya", deity: "Brahma", lord: "Venus", meaning: "Good fortune" },
    ElementMeta { name: "Shobhana", deity: "Brihaspati", lord: "Sun", meaning: "Splendour" },
    ElementMeta { name: "Atiganda", deity: "Chandra", lord: "Moon", meaning: "Danger" },
    ElementMeta { name: "Sukarma", deity: "Indra", lord: "Mars", meaning: "Virtuous deeds" },
    ElementMeta { name: "Dhriti", deity: "Apas", lord: "Rahu", meaning: "Steadiness" },
    ElementMeta { name: "Shula", deity: "Sarpa", lord: "Jupiter", meaning: "The spear" },
    ElementMeta { name: "Ganda", deity: "Agni", lord: "Saturn", meaning: "Obstacles" },
    ElementMeta { name: "Vriddhi", deity: "Surya", lord: "Mercury", meaning: "Increase" },
    ElementMeta { name: "Dhruva", deity: "Bhumi", lord: "Ketu", meaning: "Constancy" },
    ElementMeta { name: "Vyaghata", deity: "Vayu", lord: "Venus", meaning: "Calamity" },
    ElementMeta { name: "Harshana", deity: "Bhaga", lord: "Sun", meaning: "Delight" },
    ElementMeta { name: "Vajra", deity: "Varuna", lord: "Moon", meaning: "The thunderbolt" },
    ElementMeta { name: "Siddhi", deity: "Ganesha", lord: "Mars", meaning: "Accomplishment" },
    ElementMeta { name: "Vyatipata", deity: "Rudra", lord: "Rahu", meaning: "Great fall" },
    ElementMeta { name: "Variyana", deity: "Kubera", lord: "Jupiter", meaning: "Comfort" },
    ElementMeta { name: "Parigha", deity: "Vishvakarma", lord: "Saturn", meaning: "The iron bar" },
    ElementMeta { name: "Shiva", deity: "Mitra", lord: "Mercury", meaning: "Auspiciousness" },
    ElementMeta { name: "Siddha", deity: "Kartikeya", lord: "Ketu", meaning: "Attainment" },
    ElementMeta { name: "Sadhya", deity: "Savitar", lord: "Venus", meaning: "Achievable" },
    ElementMeta { name: "Shubha", deity: "Lakshmi", lord: "Sun", meaning: "Bright" },
    ElementMeta { name: "Shukla", deity: "Parvati", lord: "Moon", meaning: "Pure white" },
    ElementMeta { name: "Brahma", deity: "Ashwini Kumaras", lord: "Mars", meaning: "Sacred truth" },
    ElementMeta { name: "Indra", deity: "Pitru", lord: "Rahu", meaning: "Leadership" },
    ElementMeta { name: "Vaidhriti", deity: "Diti", lord: "Jupiter", meaning: "Division" },
];

/// The 11 karanas: seven movable, four fixed.
const KARANA: [ElementMeta; 11] = [
    ElementMeta { name: "Bava", deity: "Indra", lord: "Sun", meaning: "Gainful work" },
    ElementMeta { name: "Balava", deity: "Brahma", lord: "Moon", meaning: "Learning" },
    ElementMeta { name: "Kaulava", deity: "Mitra", lord: "Mars", meaning: "Partnership" },
    ElementMeta { name: "Taitila", deity: "Aryaman", lord: "Mercury", meaning: "Housework" },
    ElementMeta { name: "Gara", deity: "Bhumi", lord: "Jupiter", meaning: "Agriculture" },
    ElementMeta { name: "Vanija", deity: "Lakshmi", lord: "Venus", meaning: "Trade" },
    ElementMeta { name: "Vishti", deity: "Yama", lord: "Saturn", meaning: "Inauspicious for starts" },
    ElementMeta { name: "Shakuni", deity: "Garuda", lord: "Rahu", meaning: "Remedies" },
    ElementMeta { name: "Chatushpada", deity: "Nandi", lord: "Ketu", meaning: "Animal care" },
    ElementMeta { name: "Naga", deity: "Sarpa", lord: "Saturn", meaning: "Stillness" },
    ElementMeta { name: "Kimstughna", deity: "Vayu", lord: "Jupiter", meaning: "Rituals" },
];

/// The 12 zodiacal signs the Moon transits.
const RASHI: [RashiMeta; 12] = [
    RashiMeta { name: "Mesha", lord: "Mars", element: "Fire" },
    RashiMeta { name: "Vrishabha", lord: "Venus", element: "Earth" },
    RashiMeta { name: "Mithuna", lord: "Mercury", element: "Air" },
    RashiMeta { name: "Karka", lord: "Moon", element: "Water" },
    RashiMeta { name: "Simha", lord: "Sun", element: "Fire" },
    RashiMeta { name: "Kanya", lord: "Mercury", element: "Earth" },
    RashiMeta { name: "Tula", lord: "Venus", element: "Air" },
    RashiMeta { name: "Vrishchika", lord: "Mars", element: "Water" },
    RashiMeta { name: "Dhanu", lord: "Jupiter", element: "Fire" },
    RashiMeta { name: "Makara", lord: "Saturn", element: "Earth" },
    RashiMeta { name: "Kumbha", lord: "Saturn", element: "Air" },
    RashiMeta { name: "Meena", lord: "Jupiter", element: "Water" },
];

/// Lunar month names, Chaitra first.
pub const MASA: [&str; 12] = [
    "Chaitra", "Vaishakha", "Jyeshtha", "Ashadha", "Shravana", "Bhadrapada",
    "Ashwin", "Kartik", "Margashirsha", "Pausha", "Magha", "Phalguna",
];

/// The six seasons, two lunar months each, Vasanta first.
pub const RITU: [&str; 6] = [
    "Vasanta", "Grishma", "Varsha", "Sharad", "Hemanta", "Shishira",
];

// ---

/// Tithi name for a position in the 30-tithi lunar month (cyclic).
pub fn tithi_name(index: usize) -> &'static str {
    // ---
    match index % 30 {
        14 => "Purnima",
        29 => "Amavasya",
        i => TITHI[i % 15].name,
    }
}

pub fn nakshatra_name(index: usize) -> &'static str {
    NAKSHATRA[index % NAKSHATRA.len()].name
}

pub fn yoga_name(index: usize) -> &'static str {
    YOGA[index % YOGA.len()].name
}

pub fn karana_name(index: usize) -> &'static str {
    KARANA[index % KARANA.len()].name
}

pub fn rashi_name(index: usize) -> &'static str {
    RASHI[index % RASHI.len()].name
}

/// Paksha for a 30-tithi cycle position: waxing for 0-14, waning after.
pub fn paksha_for(index: usize) -> &'static str {
    if index % 30 < 15 {
        "Shukla"
    } else {
        "Krishna"
    }
}

// ---

fn find(table: &'static [ElementMeta], name: &str) -> &'static ElementMeta {
    table
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(name.trim()))
        .unwrap_or(&UNKNOWN_ELEMENT)
}

pub fn tithi_meta(name: &str) -> &'static ElementMeta {
    find(&TITHI, name)
}

pub fn nakshatra_meta(name: &str) -> &'static ElementMeta {
    find(&NAKSHATRA, name)
}

pub fn yoga_meta(name: &str) -> &'static ElementMeta {
    find(&YOGA, name)
}

pub fn karana_meta(name: &str) -> &'static ElementMeta {
    find(&KARANA, name)
}

pub fn rashi_meta(name: &str) -> &'static RashiMeta {
    RASHI
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(name.trim()))
        .unwrap_or(&UNKNOWN_RASHI)
}

/// Position of a name within its cycle, if it is a recognized table entry.
/// Used to derive `next_name` when a scraped name wins the merge.
pub fn tithi_position(name: &str) -> Option<usize> {
    // ---
    let name = name.trim();
    if name.eq_ignore_ascii_case("Purnima") {
        return Some(14);
    }
    if name.eq_ignore_ascii_case("Amavasya") {
        return Some(29);
    }
    TITHI[..14]
        .iter()
        .position(|e| e.name.eq_ignore_ascii_case(name))
}

pub fn nakshatra_position(name: &str) -> Option<usize> {
    position_in(&NAKSHATRA, name)
}

pub fn yoga_position(name: &str) -> Option<usize> {
    position_in(&YOGA, name)
}

pub fn karana_position(name: &str) -> Option<usize> {
    position_in(&KARANA, name)
}

fn position_in(table: &'static [ElementMeta], name: &str) -> Option<usize> {
    let name = name.trim();
    table.iter().position(|e| e.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn every_nakshatra_has_real_metadata() {
        // ---
        for i in 0..27 {
            let name = nakshatra_name(i);
            let meta = nakshatra_meta(name);
            assert_ne!(meta.lord, "Unknown", "{name} has no lord");
            assert_ne!(meta.deity, "Unknown", "{name} has no deity");
        }
    }

    #[test]
    fn unknown_names_map_to_sentinel() {
        // ---
        let meta = nakshatra_meta("Definitely Not A Nakshatra");
        assert_eq!(meta.name, "Unknown");
        assert_eq!(meta.deity, "Unknown");
        assert_eq!(meta.lord, "Unknown");
        assert_eq!(meta.meaning, "Unknown");
        assert_eq!(rashi_meta("Nope").element, "Unknown");
        assert_eq!(tithi_meta("").name, "Unknown");
    }

    #[test]
    fn tithi_cycle_has_paksha_closers() {
        // ---
        assert_eq!(tithi_name(0), "Pratipada");
        assert_eq!(tithi_name(14), "Purnima");
        assert_eq!(tithi_name(15), "Pratipada");
        assert_eq!(tithi_name(29), "Amavasya");
        assert_eq!(tithi_name(30), "Pratipada"); // wraps
        assert_eq!(paksha_for(3), "Shukla");
        assert_eq!(paksha_for(20), "Krishna");
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        assert_eq!(nakshatra_meta("revati").lord, "Mercury");
        assert_eq!(nakshatra_meta(" REVATI ").deity, "Pushan");
    }

    #[test]
    fn positions_invert_names() {
        // ---
        for i in 0..27 {
            assert_eq!(nakshatra_position(nakshatra_name(i)), Some(i));
        }
        for i in 0..11 {
            assert_eq!(karana_position(karana_name(i)), Some(i));
        }
        assert_eq!(tithi_position("Purnima"), Some(14));
        assert_eq!(tithi_position("Amavasya"), Some(29));
        assert_eq!(tithi_position("Ekadashi"), Some(10));
        assert_eq!(yoga_position("No Such Yoga"), None);
    }
}
