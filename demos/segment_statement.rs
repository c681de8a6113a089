use anyhow::Result;
use chrono::{Local, NaiveDate};
use income_analyzer::*;

const SAMPLE_STATEMENT: &str = "\
Banco Azul - Extrato de Conta Corrente
05/01/2026 PIX recebido de Empresa XYZ R$ 1.500,00 C
06/01/2026 PIX recebido de Empresa XYZ R$ 25,00 C
09/01/2026 PIX enviado para Carlos Mendes R$ 750,00 D
";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let api_key = std::env::var("GEMINI_API_KEY")?;

    let client = GeminiClient::new(api_key);
    let segmenter = StatementSegmenter::new(client, "gemini-2.5-flash");

    let context = CaseContext::new("Ana Silva");
    let reference: NaiveDate = Local::now().date_naive();

    let verification =
        analyze_statement(&segmenter, SAMPLE_STATEMENT, &context, reference).await?;

    println!("{}", VerificationExport::from_verification(&verification).to_markdown());
    Ok(())
}
