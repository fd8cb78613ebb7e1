use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Row as _};
use tracing::debug;

use crate::{ChosenRow, Error, category::DiscCategory, error::Result};

/// Payload for creating a disc. Id and creation timestamp are always
/// assigned by the repository, whatever the client sent.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[serde(rename_all = "camelCase")]
#[garde(allow_unvalidated)]
pub struct CreateDisc {
    #[garde(length(min = 1, max = 100))]
    pub name: String,
    pub category: DiscCategory,
    #[serde(default)]
    #[garde(length(max = 50))]
    pub brand: String,
    #[serde(default)]
    #[garde(length(max = 500))]
    pub description: String,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub glide: f64,
    #[serde(default)]
    pub turn: f64,
    #[serde(default)]
    pub fade: f64,
    #[serde(default)]
    #[garde(length(max = 20))]
    pub plastic: String,
    #[serde(default)]
    #[garde(length(max = 20))]
    pub color: String,
    #[serde(default)]
    pub weight: i64,
    #[garde(length(max = 500))]
    pub image_path: Option<String>,
    #[garde(range(min = 0.0, max = 100.0))]
    pub image_position_x: Option<f64>,
    #[garde(range(min = 0.0, max = 100.0))]
    pub image_position_y: Option<f64>,
    #[garde(range(min = 50.0, max = 200.0))]
    pub image_zoom: Option<f64>,
}

/// Full-update payload. Carries the record id so the API can check it
/// against the path. Image positioning is updated through its own
/// operation, never here.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[serde(rename_all = "camelCase")]
#[garde(allow_unvalidated)]
pub struct UpdateDisc {
    #[garde(range(min = 1))]
    pub id: i64,
    #[garde(length(min = 1, max = 100))]
    pub name: String,
    pub category: DiscCategory,
    #[serde(default)]
    #[garde(length(max = 50))]
    pub brand: String,
    #[serde(default)]
    #[garde(length(max = 500))]
    pub description: String,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub glide: f64,
    #[serde(default)]
    pub turn: f64,
    #[serde(default)]
    pub fade: f64,
    #[serde(default)]
    #[garde(length(max = 20))]
    pub plastic: String,
    #[serde(default)]
    #[garde(length(max = 20))]
    pub color: String,
    #[serde(default)]
    pub weight: i64,
    #[garde(length(max = 500))]
    pub image_path: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Disc {
    pub id: i64,
    pub name: String,
    pub category: DiscCategory,
    pub brand: String,
    pub description: String,
    pub speed: f64,
    pub glide: f64,
    pub turn: f64,
    pub fade: f64,
    pub plastic: String,
    pub color: String,
    pub weight: i64,
    pub image_path: Option<String>,
    pub image_position_x: f64,
    pub image_position_y: f64,
    pub image_zoom: f64,
    #[serde(rename = "createdDate")]
    pub created: time::PrimitiveDateTime,
    /// speed|glide|turn|fade, computed from the stored values
    pub flight_numbers: String,
}

pub fn flight_numbers(speed: f64, glide: f64, turn: f64, fade: f64) -> String {
    format!("{speed}|{glide}|{turn}|{fade}")
}

impl sqlx::FromRow<'_, ChosenRow> for Disc {
    fn from_row(row: &ChosenRow) -> Result<Self, sqlx::Error> {
        let category = DiscCategory::try_from(row.try_get::<i64, _>("category")?).map_err(|e| {
            sqlx::Error::ColumnDecode {
                index: "category".into(),
                source: Box::new(e),
            }
        })?;
        let speed: f64 = row.try_get("speed")?;
        let glide: f64 = row.try_get("glide")?;
        let turn: f64 = row.try_get("turn")?;
        let fade: f64 = row.try_get("fade")?;
        Ok(Disc {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            category,
            brand: row.try_get("brand")?,
            description: row.try_get("description")?,
            speed,
            glide,
            turn,
            fade,
            plastic: row.try_get("plastic")?,
            color: row.try_get("color")?,
            weight: row.try_get("weight")?,
            image_path: row.try_get("image_path")?,
            image_position_x: row.try_get("image_position_x")?,
            image_position_y: row.try_get("image_position_y")?,
            image_zoom: row.try_get("image_zoom")?,
            created: row.try_get("created")?,
            flight_numbers: flight_numbers(speed, glide, turn, fade),
        })
    }
}

const DEFAULT_POSITION: f64 = 50.0;
const DEFAULT_ZOOM: f64 = 100.0;

pub type DiscRepository = DiscRepositoryImpl<Pool<crate::ChosenDB>>;

pub struct DiscRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> DiscRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = crate::ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn get(&self, id: i64) -> Result<Disc> {
        let record = sqlx::query_as::<_, Disc>("SELECT * FROM disc WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("Disc {id}")))?;
        Ok(record)
    }

    /// All discs, ordered by category ordinal, then by name.
    pub async fn list_all(&self) -> Result<Vec<Disc>> {
        let records = sqlx::query_as::<_, Disc>("SELECT * FROM disc ORDER BY category, name")
            .fetch_all(&self.executor)
            .await?;
        Ok(records)
    }

    pub async fn list_by_category(&self, category: DiscCategory) -> Result<Vec<Disc>> {
        let records =
            sqlx::query_as::<_, Disc>("SELECT * FROM disc WHERE category = ? ORDER BY name")
                .bind(category.id())
                .fetch_all(&self.executor)
                .await?;
        Ok(records)
    }

    pub async fn create(&self, payload: CreateDisc) -> Result<Disc> {
        const SQL: &str = "INSERT INTO disc \
            (name, category, brand, description, speed, glide, turn, fade, plastic, color, weight, \
            image_path, image_position_x, image_position_y, image_zoom, created) \
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, datetime('now'))";
        let image_path = payload.image_path.filter(|p| !p.is_empty());
        let result = sqlx::query(SQL)
            .bind(&payload.name)
            .bind(payload.category.id())
            .bind(&payload.brand)
            .bind(&payload.description)
            .bind(payload.speed)
            .bind(payload.glide)
            .bind(payload.turn)
            .bind(payload.fade)
            .bind(&payload.plastic)
            .bind(&payload.color)
            .bind(payload.weight)
            .bind(image_path)
            .bind(payload.image_position_x.unwrap_or(DEFAULT_POSITION))
            .bind(payload.image_position_y.unwrap_or(DEFAULT_POSITION))
            .bind(payload.image_zoom.unwrap_or(DEFAULT_ZOOM))
            .execute(&self.executor)
            .await?;

        let id = result.last_insert_rowid();
        self.get(id).await
    }

    /// Overwrites every mutable field from the payload, except that the
    /// stored image path survives unless the payload carries a non-empty
    /// replacement. Positioning and creation timestamp are never touched.
    pub async fn update(&self, id: i64, payload: UpdateDisc) -> Result<Disc> {
        let existing = self.get(id).await?;
        let image_path = match payload.image_path.filter(|p| !p.is_empty()) {
            Some(path) => Some(path),
            None => existing.image_path,
        };
        const SQL: &str = "UPDATE disc SET \
            name = ?, category = ?, brand = ?, description = ?, speed = ?, glide = ?, \
            turn = ?, fade = ?, plastic = ?, color = ?, weight = ?, image_path = ? \
            WHERE id = ?";
        let result = sqlx::query(SQL)
            .bind(&payload.name)
            .bind(payload.category.id())
            .bind(&payload.brand)
            .bind(&payload.description)
            .bind(payload.speed)
            .bind(payload.glide)
            .bind(payload.turn)
            .bind(payload.fade)
            .bind(&payload.plastic)
            .bind(&payload.color)
            .bind(payload.weight)
            .bind(image_path)
            .bind(id)
            .execute(&self.executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound(format!("Disc {id}")));
        }
        self.get(id).await
    }

    /// Narrow update used by the image attachment workflow. Returns the
    /// previously stored path so the caller can release the old file.
    pub async fn set_image_path(&self, id: i64, path: &str) -> Result<Option<String>> {
        let previous = self.get(id).await?.image_path;
        let result = sqlx::query("UPDATE disc SET image_path = ? WHERE id = ?")
            .bind(path)
            .bind(id)
            .execute(&self.executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound(format!("Disc {id}")));
        }
        Ok(previous)
    }

    pub async fn update_image_position(&self, id: i64, x: f64, y: f64, zoom: f64) -> Result<()> {
        let result = sqlx::query(
            "UPDATE disc SET image_position_x = ?, image_position_y = ?, image_zoom = ? WHERE id = ?",
        )
        .bind(x)
        .bind(y)
        .bind(zoom)
        .bind(id)
        .execute(&self.executor)
        .await?;
        if result.rows_affected() == 0 {
            Err(Error::RecordNotFound(format!("Disc {id}")))
        } else {
            Ok(())
        }
    }

    /// Deletes the record and returns the image path that was stored on it,
    /// so the caller can release the file. The filesystem is never touched
    /// here.
    pub async fn delete(&self, id: i64) -> Result<Option<String>> {
        let existing = self.get(id).await?;
        let result = sqlx::query("DELETE FROM disc WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound(format!("Disc {id}")));
        }
        debug!("Deleted disc {id}");
        Ok(existing.image_path)
    }
}
