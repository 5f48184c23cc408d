use crate::csv::{clean_cell, normalize_header};
use crate::error::Result;
use crate::source::{fetch_table, RawTable, Source};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links {
    pub kakobuy: String,
    pub usfans: String,
    pub cnfans: String,
}

/// One catalog entry, as posted to the channels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductRecord {
    pub photo_url: String,
    pub name: String,
    pub price: String,
    pub links: Links,
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Photo,
    Name,
    Price,
    Kakobuy,
    Usfans,
    Cnfans,
    Category,
}

impl Field {
    /// Column order of header-less sheets.
    const POSITIONAL: [Field; 7] = [
        Field::Photo,
        Field::Name,
        Field::Price,
        Field::Kakobuy,
        Field::Usfans,
        Field::Cnfans,
        Field::Category,
    ];

    /// Normalized header spellings accepted for this field.
    fn header_names(self) -> &'static [&'static str] {
        match self {
            Field::Photo => &["foto"],
            Field::Name => &["nombre"],
            Field::Price => &["precio"],
            Field::Kakobuy => &["link kakobuy"],
            Field::Usfans => &["link usfans"],
            Field::Cnfans => &["link de cnfans", "link cnfans"],
            Field::Category => &["categrias", "categorias", "categoria"],
        }
    }
}

/// Column index of every field, `None` when the sheet lacks that column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    photo: Option<usize>,
    name: Option<usize>,
    price: Option<usize>,
    kakobuy: Option<usize>,
    usfans: Option<usize>,
    cnfans: Option<usize>,
    category: Option<usize>,
}

impl ColumnMap {
    pub fn positional() -> Self {
        let mut map = Self::empty();
        for (idx, field) in Field::POSITIONAL.iter().enumerate() {
            map.set(*field, idx);
        }
        map
    }

    pub fn from_header(header: &[String]) -> Self {
        let normalized: Vec<String> = header.iter().map(|h| normalize_header(h)).collect();
        let mut map = Self::empty();
        for field in Field::POSITIONAL {
            let found = normalized
                .iter()
                .position(|h| field.header_names().contains(&h.as_str()));
            if let Some(idx) = found {
                map.set(field, idx);
            }
        }
        map
    }

    fn empty() -> Self {
        ColumnMap {
            photo: None,
            name: None,
            price: None,
            kakobuy: None,
            usfans: None,
            cnfans: None,
            category: None,
        }
    }

    fn set(&mut self, field: Field, idx: usize) {
        let slot = match field {
            Field::Photo => &mut self.photo,
            Field::Name => &mut self.name,
            Field::Price => &mut self.price,
            Field::Kakobuy => &mut self.kakobuy,
            Field::Usfans => &mut self.usfans,
            Field::Cnfans => &mut self.cnfans,
            Field::Category => &mut self.category,
        };
        *slot = Some(idx);
    }

    /// Builds a record from one row, or `None` when its name or photo is empty.
    pub fn extract(&self, row: &[String]) -> Option<ProductRecord> {
        let get = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(|cell| clean_cell(cell))
                .unwrap_or_default()
        };

        let product = ProductRecord {
            photo_url: get(self.photo),
            name: get(self.name),
            price: get(self.price),
            links: Links {
                kakobuy: get(self.kakobuy),
                usfans: get(self.usfans),
                cnfans: get(self.cnfans),
            },
            category: get(self.category).to_lowercase(),
        };

        if product.name.is_empty() || product.photo_url.is_empty() {
            return None;
        }
        Some(product)
    }
}

/// Converts raw rows into clean records, dropping rows without a name or photo.
pub fn products_from_rows(rows: &[Vec<String>], has_header: bool) -> Vec<ProductRecord> {
    let (columns, body) = match (has_header, rows.split_first()) {
        (true, Some((header, body))) => (ColumnMap::from_header(header), body),
        (true, None) => return Vec::new(),
        (false, _) => (ColumnMap::positional(), rows),
    };
    body.iter().filter_map(|row| columns.extract(row)).collect()
}

/// The in-memory product list. Reloads swap the whole list at once.
pub struct Catalog {
    client: Client,
    source: Source,
    products: RwLock<Arc<Vec<ProductRecord>>>,
}

impl Catalog {
    pub fn new(client: Client, source: Source) -> Self {
        Catalog {
            client,
            source,
            products: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Current list. Later reloads do not affect a snapshot already taken.
    pub async fn snapshot(&self) -> Arc<Vec<ProductRecord>> {
        Arc::clone(&*self.products.read().await)
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn replace(&self, products: Vec<ProductRecord>) {
        *self.products.write().await = Arc::new(products);
    }

    /// Fetches and parses the source without touching the current list.
    pub async fn load(&self) -> Result<Vec<ProductRecord>> {
        let RawTable { rows, has_header } = fetch_table(&self.client, &self.source).await?;
        Ok(products_from_rows(&rows, has_header))
    }

    /// Loads the source and swaps the list in. On failure the old list stays.
    pub async fn reload(&self) -> Result<usize> {
        match self.load().await {
            Ok(products) => {
                let count = products.len();
                self.replace(products).await;
                info!("Products loaded: {}", count);
                Ok(count)
            }
            Err(e) => {
                error!("Error reading product source, keeping previous list: {:?}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn header_matching_ignores_case_and_spacing() {
        let header = row(&[
            "foto",
            "nombre",
            "precio",
            "LINK kakobuy",
            " link usfans",
            "link de cnfans",
            "CATEGRIAS",
        ]);
        assert_eq!(ColumnMap::from_header(&header), ColumnMap::positional());
    }

    #[test]
    fn missing_columns_yield_empty_fields() {
        let rows = vec![
            row(&["nombre", "foto"]),
            row(&["Bolso", "http://img/bolso.png"]),
        ];
        let products = products_from_rows(&rows, true);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Bolso");
        assert_eq!(products[0].photo_url, "http://img/bolso.png");
        assert_eq!(products[0].price, "");
        assert_eq!(products[0].links, Links::default());
    }

    #[test]
    fn rows_without_name_or_photo_are_dropped() {
        let rows = vec![
            row(&["foto", "nombre", "precio"]),
            row(&["http://a.png", "Shoe, Red", "10"]),
            row(&["", "", ""]),
            row(&["http://b.png", "  ", "12"]),
            row(&["", "Sin foto", "5"]),
        ];
        let products = products_from_rows(&rows, true);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Shoe, Red");
    }

    #[test]
    fn empty_quoted_name_is_dropped() {
        let rows = crate::csv::parse_records("foto,nombre,precio\nhttp://a.png,\"\",10\n");
        assert!(products_from_rows(&rows, true).is_empty());
    }

    #[test]
    fn positional_rows_and_lowercased_category() {
        let rows = vec![row(&[
            "http://a.png",
            "Camiseta",
            "15€",
            "https://kakobuy.com/1",
            "https://usfans.com/1",
            "https://cnfans.com/1",
            " ROPA\n",
        ])];
        let products = products_from_rows(&rows, false);
        assert_eq!(products[0].category, "ropa");
        assert_eq!(products[0].links.usfans, "https://usfans.com/1");
    }

    #[test]
    fn short_rows_do_not_panic() {
        let rows = vec![
            row(&["foto", "nombre", "precio", "categoria"]),
            row(&["http://a.png", "Gorra"]),
        ];
        let products = products_from_rows(&rows, true);
        assert_eq!(products[0].category, "");
    }

    #[test]
    fn header_only_table_is_empty() {
        assert!(products_from_rows(&[row(&["foto", "nombre"])], true).is_empty());
        assert!(products_from_rows(&[], true).is_empty());
    }
}
