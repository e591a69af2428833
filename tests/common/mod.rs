#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tea_explorer::catalog::{CatalogLoader, CatalogSet, CatalogSource};

/// Five teas (two Green, three Black) plus one blend
pub const TEAS_YAML: &str = r#"
tea:
  - name: Darjeeling First Flush
    category: Black
    origin: India
    region: Darjeeling
    flavor_profile: Muscatel, floral
    brew_temp_c: 85-90
    steep_time: 2-3 min
    cultivars: [AV2, Clonal]
  - name: Sencha
    category: Green
    origin: Japan
    region: Shizuoka
    flavor_profile: Grassy, vegetal
    brew_temp_c: 70-80
    steep_time: 1-2
    cultivars: [Yabukita]
  - name: Earl Grey
    category: Black
    origin: Blend
    flavor_profile: Bergamot over a dark malty base
    brew_temp_c: 95-100
  - name: Gyokuro
    category: green
    origin: Japan
    region: Uji
    flavor_profile: Umami, sweet
    brew_temp_c: [50, 60]
    cultivars: Yabukita, Saemidori
  - name: Assam
    category: Black
    origin: India
    region: Assam
    flavor_profile: Malty, brisk
    brew_temp_c: {min: 95, max: 100}

blend:
  - id: earl-grey
    name: Earl Grey
    category: Flavored Black
    base_tea: Black
    ingredients: [Black tea, Bergamot oil]
"#;

pub const TISANES_YAML: &str = r#"
tisane:
  - id: hibiscus
    name: Hibiscus
    scientific_name: Hibiscus sabdariffa
    common_names: {en: Roselle, es: Flor de Jamaica}
    cultivation_countries: [Egypt, Sudan, Mexico]
    flavor_profile: Tart, cranberry-like
    brew_temp_c: 95-100
    risk_level: Moderate
  - name: Chamomile
    scientific_name: Matricaria chamomilla
    flavor_profile: Apple, honey
    brew_temp_c: 90-95
    risk_level: Low
"#;

/// Write a data file into `dir` and return its path
pub fn write_data(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Both fixture files in a temporary directory
pub fn fixture_source(dir: &Path) -> CatalogSource {
    CatalogSource::new([
        write_data(dir, "teas.yaml", TEAS_YAML),
        write_data(dir, "tisanes.yaml", TISANES_YAML),
    ])
}

pub fn load_fixture(dir: &Path) -> CatalogSet {
    CatalogLoader::strict().load(&fixture_source(dir)).unwrap()
}
