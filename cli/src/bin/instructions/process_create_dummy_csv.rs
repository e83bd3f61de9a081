use crate::*;

use csv::Writer;

pub fn process_create_dummy_csv(dummy_csv_args: &CreateDummyCsvArgs) -> Result<()> {
    let mut wtr = Writer::from_path(&dummy_csv_args.csv_path)?;
    wtr.write_record(["address", "amount"])?;
    for _ in 0..dummy_csv_args.num_records {
        wtr.write_record([
            Pubkey::new_unique().to_string(),
            dummy_csv_args.amount.to_string(),
        ])?;
    }
    wtr.flush()?;

    println!(
        "wrote {} recipients to {}",
        dummy_csv_args.num_records,
        dummy_csv_args.csv_path.display()
    );
    Ok(())
}
