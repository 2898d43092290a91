//! Test fixtures for integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use triage::embedding::MockEmbedder;

pub const DIMENSION: usize = 4;

pub const CSV_HEADER: &str = "Вопрос клиента,Шаблон ответа,Основная категория,Подкатегория";

/// One knowledge-base row plus the embedding its question should receive.
#[derive(Debug, Clone)]
pub struct FixtureRow {
    pub question: String,
    pub template: String,
    pub category: String,
    pub subcategory: String,
    pub vector: Option<Vec<f32>>,
}

#[derive(Default)]
pub struct DatasetFixture {
    rows: Vec<FixtureRow>,
    queries: Vec<(String, Vec<f32>)>,
}

impl DatasetFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, question: &str, template: &str, vector: [f32; DIMENSION]) -> Self {
        self.rows.push(FixtureRow {
            question: question.to_string(),
            template: template.to_string(),
            category: "Аккаунт".to_string(),
            subcategory: "Доступ".to_string(),
            vector: Some(vector.to_vec()),
        });
        self
    }

    /// A row the builder must skip (no template).
    pub fn incomplete_row(mut self, question: &str) -> Self {
        self.rows.push(FixtureRow {
            question: question.to_string(),
            template: String::new(),
            category: String::new(),
            subcategory: String::new(),
            vector: None,
        });
        self
    }

    /// Pins the embedding a query text receives at resolve time.
    pub fn query(mut self, text: &str, vector: [f32; DIMENSION]) -> Self {
        self.queries.push((text.to_string(), vector.to_vec()));
        self
    }

    pub fn rows(&self) -> &[FixtureRow] {
        &self.rows
    }

    pub fn write_csv(&self, dir: &Path) -> PathBuf {
        let mut body = String::from(CSV_HEADER);
        body.push('\n');
        for row in &self.rows {
            body.push_str(&format!(
                "{},{},{},{}\n",
                row.question, row.template, row.category, row.subcategory
            ));
        }

        let path = dir.join("smart_support.csv");
        fs::write(&path, body).expect("write dataset");
        path
    }

    /// An embedder that knows every row and query vector of this fixture.
    pub fn embedder(&self) -> MockEmbedder {
        let mut embedder = MockEmbedder::new(DIMENSION);
        for row in &self.rows {
            if let Some(vector) = &row.vector {
                embedder = embedder.with_vector(row.question.clone(), vector.clone());
            }
        }
        for (text, vector) in &self.queries {
            embedder = embedder.with_vector(text.clone(), vector.clone());
        }
        embedder
    }
}

/// Password, recovery, email and support entries; password and recovery are near neighbours.
pub fn support_fixture() -> DatasetFixture {
    DatasetFixture::new()
        .row(
            "Как сбросить пароль?",
            "Нажмите «Забыли пароль?» на странице входа.",
            [1.0, 0.0, 0.0, 0.0],
        )
        .row(
            "Я забыл пароль и не могу войти",
            "Воспользуйтесь формой восстановления доступа.",
            [0.96, 0.28, 0.0, 0.0],
        )
        .incomplete_row("Где мой заказ?")
        .row(
            "Как изменить email?",
            "Откройте Профиль и выберите Настройки.",
            [0.0, 0.0, 1.0, 0.0],
        )
        .row(
            "Как связаться с поддержкой?",
            "Напишите в чат поддержки.",
            [0.0, 0.0, 0.0, 1.0],
        )
}

/// A valid arbiter reply ranking the given 1-based candidates with the given confidences.
pub fn ranking_json(items: &[(usize, u8)]) -> String {
    let ranking: Vec<serde_json::Value> = items
        .iter()
        .map(|(candidate, confidence)| {
            serde_json::json!({
                "candidate": candidate,
                "confidence": confidence,
                "reason": format!("кандидат {}", candidate),
            })
        })
        .collect();
    serde_json::json!({ "ranking": ranking }).to_string()
}
