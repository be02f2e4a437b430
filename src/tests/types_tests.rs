#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::types::{BoxType, MapEntry};

    #[test]
    fn test_box_type_parse() {
        assert_eq!("EL".parse::<BoxType>().unwrap(), BoxType::EarlyLearning);
        assert_eq!("Kids".parse::<BoxType>().unwrap(), BoxType::Kids);
        assert_eq!("Teens".parse::<BoxType>().unwrap(), BoxType::Teens);
        assert!("kids".parse::<BoxType>().is_err());
        assert!("Adults".parse::<BoxType>().is_err());
        assert!("".parse::<BoxType>().is_err());
    }

    #[test]
    fn test_box_type_wire_names() {
        assert_eq!(serde_json::to_string(&BoxType::EarlyLearning).unwrap(), "\"EL\"");
        assert_eq!(serde_json::from_str::<BoxType>("\"Teens\"").unwrap(), BoxType::Teens);
        assert_eq!(BoxType::EarlyLearning.to_string(), "EL");
        assert_eq!(BoxType::EarlyLearning.display_name(), "Early Learning");
    }

    #[test]
    fn test_map_entry_serializes_inventory_keys() {
        let mut inventory = BTreeMap::new();
        inventory.insert(BoxType::Teens, 20);
        inventory.insert(BoxType::EarlyLearning, 35);
        let entry = MapEntry {
            library_id: 1,
            library_name: "Vashon".into(),
            latitude: 47.447,
            longitude: -122.46,
            address: None,
            inventory,
            total_boxes: 55,
        };

        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v["inventory"]["EL"], 35);
        assert_eq!(v["inventory"]["Teens"], 20);
        assert!(v["inventory"].get("Kids").is_none());
        assert_eq!(v["total_boxes"], 55);
    }
}
