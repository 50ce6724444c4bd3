//! Shorthand item names ("greenscience", "gears") mapped to recipe ids

/// Resolve a shorthand name to its canonical item id.
///
/// The lookup ignores underscores and case, and tolerates one trailing `s`,
/// so `Green_Circuits` finds `electronic_circuit`. Names that are not
/// aliases are returned unchanged.
pub fn canonical_item_name(name: &str) -> String {
    let mut key: String = name
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect();
    if key.ends_with('s') {
        key.pop();
    }

    match lookup(&key) {
        Some(item) => item.to_string(),
        None => name.to_string(),
    }
}

fn lookup(key: &str) -> Option<&'static str> {
    let item = match key {
        "gear" => "iron_gear_wheel",
        // belts
        "yellowbelt" => "transport_belt",
        "redbelt" => "fast_transport_belt",
        "bluebelt" => "express_transport_belt",
        "yellowunderground" => "underground_belt",
        "redunderground" => "fast_underground_belt",
        "blueunderground" => "express_underground_belt",
        "yellowsplitter" => "splitter",
        "redsplitter" => "fast_splitter",
        "bluesplitter" => "express_splitter",
        // inserters
        "yellowinserter" => "inserter",
        "redinserter" => "long_handed_inserter",
        "blueinserter" => "fast_inserter",
        // circuits
        "greencircuit" => "electronic_circuit",
        "redcircuit" => "advanced_circuit",
        "bluecircuit" => "processing_unit",
        // assemblers
        "assembler" => "assembling_machine_1",
        "blueassembler" => "assembling_machine_2",
        "yellowassembler" | "greenassembler" => "assembling_machine_3",
        "plastic" => "plastic_bar",
        // science
        "redscience" => "automation_science_pack",
        "greenscience" => "logistic_science_pack",
        "greyscience" | "grayscience" => "military_science_pack",
        "bluescience" => "chemical_science_pack",
        "purplescience" => "production_science_pack",
        "yellowscience" => "utility_science_pack",
        "whitescience" => "space_science_pack",
        _ => return None,
    };
    Some(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_shorthand() {
        assert_eq!(canonical_item_name("greenscience"), "logistic_science_pack");
        assert_eq!(canonical_item_name("Grey_Science"), "military_science_pack");
        assert_eq!(canonical_item_name("gears"), "iron_gear_wheel");
        assert_eq!(canonical_item_name("RedCircuits"), "advanced_circuit");
    }

    #[test]
    fn passes_through_real_names() {
        assert_eq!(canonical_item_name("military_science_pack"), "military_science_pack");
        assert_eq!(canonical_item_name("wall"), "wall");
        // plural stripping must not mangle unknown names
        assert_eq!(canonical_item_name("grenades"), "grenades");
    }
}
