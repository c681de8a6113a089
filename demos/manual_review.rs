use anyhow::Result;
use chrono::NaiveDate;
use income_analyzer::*;

fn main() -> Result<()> {
    let context = CaseContext::new("Ana Silva")
        .with_parents(Some("José Silva Pereira".to_string()), None);

    let records = vec![
        RawTransaction {
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            description: "PIX recebido".to_string(),
            amount: 1500.0,
            bank: "Banco Azul".to_string(),
            sender: "Empresa XYZ".to_string(),
            direction: Direction::Inflow,
            is_valid: None,
        },
        RawTransaction {
            date: NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(),
            description: "PIX recebido".to_string(),
            amount: 25.0,
            bank: "Banco Azul".to_string(),
            sender: "Empresa XYZ".to_string(),
            direction: Direction::Inflow,
            is_valid: None,
        },
    ];

    let reference = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
    let mut verification = analyze_records(&records, &context, reference, "extrato colado")?;

    println!("--- Resultado automático ---\n");
    println!("{}", VerificationExport::from_verification(&verification).to_markdown());

    // The operator restores the small transaction after checking the statement.
    let january = verification
        .monthly_data
        .iter()
        .position(|m| m.month == "Janeiro/2026")
        .expect("January bucket");
    let small_id = verification.monthly_data[january]
        .transactions
        .iter()
        .find(|t| !t.is_valid)
        .expect("excluded row")
        .id;
    verification.set_validity(january, small_id, true)?;

    println!("--- Após revisão manual ---\n");
    println!("{}", VerificationExport::from_verification(&verification).to_markdown());

    let store = MemoryStore::new();
    store.save(verification)?;
    println!("{} verificação(ões) no histórico", store.list()?.len());

    Ok(())
}
