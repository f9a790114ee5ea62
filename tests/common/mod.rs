#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;

use makeup_matchmaker::{
    config::PipelineSettings,
    error::AppResult,
    models::{IngestedImage, PriceValue, ProductRecord, ProductType, UploadTicket},
    services::{
        analysis::SkinAnalyzer, llm::TextGenerator, providers::ProductSource,
        storage::ObjectStorage, SubmissionRequest,
    },
};

mock! {
    pub Source {}

    #[async_trait]
    impl ProductSource for Source {
        async fn fetch_products(&self, product_type: ProductType) -> AppResult<Vec<ProductRecord>>;
        fn name(&self) -> &'static str;
    }
}

mock! {
    pub Generator {}

    #[async_trait]
    impl TextGenerator for Generator {
        async fn generate(&self, prompt: &str) -> AppResult<String>;
        fn name(&self) -> &'static str;
    }
}

mock! {
    pub Storage {}

    #[async_trait]
    impl ObjectStorage for Storage {
        async fn presign(&self, file_name: &str, file_type: &str) -> AppResult<UploadTicket>;
        async fn put_object(
            &self,
            ticket: &UploadTicket,
            content_type: &str,
            bytes: &[u8],
        ) -> AppResult<()>;
    }
}

mock! {
    pub Analyzer {}

    #[async_trait]
    impl SkinAnalyzer for Analyzer {
        async fn estimate_tone(&self, key: &str) -> AppResult<String>;
    }
}

pub const JPEG_MAGIC: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

pub const VALID_AI_REPLY: &str = r#"Here are my picks:
[{"name": "Matte Lip Crayon", "brand": "NYX", "type": "lipstick", "price": "$10.00", "why": "Budget friendly matte color for dry lips", "link": "https://shop.example/nyx"}]
Enjoy!"#;

/// Settings without a throttle delay so tests don't depend on timing
pub fn fast_settings() -> PipelineSettings {
    PipelineSettings {
        category_interval: Duration::ZERO,
        ..Default::default()
    }
}

pub fn product(brand: &str, name: &str, price: &str, product_type: ProductType) -> ProductRecord {
    ProductRecord {
        name: name.to_string(),
        brand: brand.to_string(),
        price: PriceValue::Text(price.to_string()),
        product_type,
        link: format!("https://shop.example/{}", name.to_lowercase().replace(' ', "-")),
        image: String::new(),
        description: None,
    }
}

pub fn face_image() -> IngestedImage {
    let mut bytes = JPEG_MAGIC.to_vec();
    bytes.extend_from_slice(&[0u8; 64]);
    IngestedImage::new("face.jpg", Some("image/jpeg"), bytes)
}

pub fn lipstick_request(budget: &str) -> SubmissionRequest {
    SubmissionRequest {
        image: Some(face_image()),
        skin_type: Some("dry".to_string()),
        finish: Some("matte".to_string()),
        budget: Some(budget.to_string()),
        product_types: vec!["lipstick".to_string()],
    }
}

pub fn lipstick_catalog() -> Vec<ProductRecord> {
    vec![
        product("NYX", "Matte Lip Crayon", "$10.00", ProductType::Lipstick),
        product("Dior", "Rouge Velvet", "$30.00", ProductType::Lipstick),
    ]
}

/// Generator that records every prompt it receives and replies with `reply`
pub fn capturing_generator(reply: &'static str) -> (MockGenerator, Arc<Mutex<Vec<String>>>) {
    let prompts = Arc::new(Mutex::new(Vec::new()));
    let captured = prompts.clone();

    let mut generator = MockGenerator::new();
    generator.expect_name().return_const("mock");
    generator.expect_generate().returning(move |prompt| {
        captured.lock().unwrap().push(prompt.to_string());
        Ok(reply.to_string())
    });

    (generator, prompts)
}
