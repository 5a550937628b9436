use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::models::StoreContext;

pub fn connect(path: &str) -> Result<Connection> {
    if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let conn = Connection::open(path).with_context(|| format!("Failed to open {}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS brands (
            id          INTEGER PRIMARY KEY,
            name        TEXT,
            website_url TEXT UNIQUE NOT NULL,
            about_text  TEXT,
            analyzed_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS products (
            id          INTEGER PRIMARY KEY,
            brand_id    INTEGER NOT NULL REFERENCES brands(id) ON DELETE CASCADE,
            external_id TEXT,
            title       TEXT NOT NULL,
            handle      TEXT,
            url         TEXT,
            image       TEXT,
            price_min   REAL,
            price_max   REAL,
            available   BOOLEAN,
            tags        TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_products_brand ON products(brand_id);

        CREATE TABLE IF NOT EXISTS faqs (
            id          INTEGER PRIMARY KEY,
            brand_id    INTEGER NOT NULL REFERENCES brands(id) ON DELETE CASCADE,
            question    TEXT NOT NULL,
            answer      TEXT NOT NULL,
            url         TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_faqs_brand ON faqs(brand_id);
        ",
    )?;
    Ok(())
}

// ── Persist ──

/// Upsert the brand by base URL and replace its products and FAQs. Returns the brand id.
pub fn persist(conn: &Connection, ctx: &StoreContext) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO brands (name, website_url, about_text, analyzed_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(website_url) DO UPDATE SET
             name        = COALESCE(excluded.name, brands.name),
             about_text  = COALESCE(excluded.about_text, brands.about_text),
             analyzed_at = excluded.analyzed_at",
        params![
            ctx.brand,
            ctx.website_url,
            ctx.about_text,
            ctx.analyzed_at.to_rfc3339()
        ],
    )?;
    let brand_id: i64 = tx.query_row(
        "SELECT id FROM brands WHERE website_url = ?1",
        [&ctx.website_url],
        |r| r.get(0),
    )?;

    tx.execute("DELETE FROM products WHERE brand_id = ?1", [brand_id])?;
    tx.execute("DELETE FROM faqs WHERE brand_id = ?1", [brand_id])?;
    {
        let mut p_stmt = tx.prepare(
            "INSERT INTO products
             (brand_id, external_id, title, handle, url, image, price_min, price_max, available, tags)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
        )?;
        for p in &ctx.whole_catalog {
            p_stmt.execute(params![
                brand_id, p.id, p.title, p.handle, p.url, p.image,
                p.price_min, p.price_max, p.available, p.tags.join(","),
            ])?;
        }

        let mut f_stmt =
            tx.prepare("INSERT INTO faqs (brand_id, question, answer, url) VALUES (?1,?2,?3,?4)")?;
        for f in &ctx.faqs {
            f_stmt.execute(params![brand_id, f.question, f.answer, f.url])?;
        }
    }
    tx.commit()?;
    Ok(brand_id)
}

// ── Overview ──

pub struct BrandRow {
    pub name: String,
    pub website_url: String,
    pub products: usize,
    pub faqs: usize,
    pub analyzed_at: String,
}

pub fn fetch_overview(conn: &Connection, limit: usize) -> Result<Vec<BrandRow>> {
    let mut stmt = conn.prepare(
        "SELECT COALESCE(b.name,''), b.website_url,
                (SELECT COUNT(*) FROM products p WHERE p.brand_id = b.id),
                (SELECT COUNT(*) FROM faqs f WHERE f.brand_id = b.id),
                b.analyzed_at
         FROM brands b
         ORDER BY b.analyzed_at DESC, b.website_url
         LIMIT ?1",
    )?;
    let rows = stmt
        .query_map([limit as i64], |row| {
            Ok(BrandRow {
                name: row.get(0)?,
                website_url: row.get(1)?,
                products: row.get(2)?,
                faqs: row.get(3)?,
                analyzed_at: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub brands: usize,
    pub products: usize,
    pub faqs: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let brands: usize = conn.query_row("SELECT COUNT(*) FROM brands", [], |r| r.get(0))?;
    let products: usize = conn.query_row("SELECT COUNT(*) FROM products", [], |r| r.get(0))?;
    let faqs: usize = conn.query_row("SELECT COUNT(*) FROM faqs", [], |r| r.get(0))?;
    Ok(Stats {
        brands,
        products,
        faqs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Faq, Product};

    fn memory() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn product(handle: &str, tags: &[&str]) -> Product {
        Product {
            id: Some(handle.len().to_string()),
            title: handle.to_uppercase(),
            handle: Some(handle.to_string()),
            url: Some(format!("https://a.com/products/{}", handle)),
            image: None,
            price_min: Some(10.0),
            price_max: Some(12.5),
            available: Some(true),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn context() -> StoreContext {
        let mut ctx = StoreContext::new(Some("Acme".into()), "https://a.com".into());
        ctx.about_text = Some("We make things.".into());
        ctx.whole_catalog = vec![product("mug", &["kitchen", "gift"]), product("cap", &[])];
        ctx.faqs = vec![Faq {
            question: "Do you ship?".into(),
            answer: "Yes.".into(),
            url: Some("https://a.com/pages/faq".into()),
        }];
        ctx
    }

    #[test]
    fn persist_writes_brand_products_and_faqs() {
        let conn = memory();
        let id = persist(&conn, &context()).unwrap();

        let tags: String = conn
            .query_row(
                "SELECT tags FROM products WHERE brand_id = ?1 AND handle = 'mug'",
                [id],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(tags, "kitchen,gift");

        let s = get_stats(&conn).unwrap();
        assert_eq!((s.brands, s.products, s.faqs), (1, 2, 1));
    }

    #[test]
    fn second_persist_replaces_children_and_keeps_known_fields() {
        let conn = memory();
        let first = persist(&conn, &context()).unwrap();

        let mut again = StoreContext::new(None, "https://a.com".into());
        again.whole_catalog = vec![product("bowl", &["kitchen"])];
        let second = persist(&conn, &again).unwrap();

        assert_eq!(first, second);
        let (name, about): (String, String) = conn
            .query_row("SELECT name, about_text FROM brands WHERE id = ?1", [first], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(name, "Acme");
        assert_eq!(about, "We make things.");

        let s = get_stats(&conn).unwrap();
        assert_eq!((s.brands, s.products, s.faqs), (1, 1, 0));
    }

    #[test]
    fn overview_counts_children() {
        let conn = memory();
        persist(&conn, &context()).unwrap();
        persist(&conn, &StoreContext::new(None, "https://b.com".into())).unwrap();

        let rows = fetch_overview(&conn, 10).unwrap();
        assert_eq!(rows.len(), 2);
        let acme = rows.iter().find(|r| r.website_url == "https://a.com").unwrap();
        assert_eq!((acme.name.as_str(), acme.products, acme.faqs), ("Acme", 2, 1));
        let other = rows.iter().find(|r| r.website_url == "https://b.com").unwrap();
        assert_eq!(other.name, "");

        assert_eq!(fetch_overview(&conn, 1).unwrap().len(), 1);
    }
}
