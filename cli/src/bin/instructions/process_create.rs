use crate::*;

use airdrop_client::{
    dashboard::CreateAirdropForm,
    recipients::{parse_recipients_file, total_amount},
    types::AirdropKind,
};

pub async fn process_create(args: &Args, create_args: &CreateArgs) -> Result<()> {
    let keypair = args.keypair()?;
    let recipients = parse_recipients_file(&create_args.csv_path)?;
    println!(
        "{} recipients, {} tokens total",
        recipients.len(),
        total_amount(&recipients)
    );

    let form = CreateAirdropForm {
        name: create_args.name.clone(),
        mint: create_args.mint.clone(),
        kind: if create_args.vested {
            AirdropKind::Vested
        } else {
            AirdropKind::Instant
        },
        start_ts: create_args.start_ts,
        end_ts: create_args.end_ts,
        unlock_interval: create_args.unlock_interval,
        cancellable: create_args.cancellable,
        single_claim: !create_args.multiple_claims,
    };

    let dashboard = args.dashboard();
    let created = dashboard.create_airdrop(&form, recipients, &keypair).await?;
    match created.signature {
        Some(signature) => println!(
            "done create airdrop {} at {} with signature {signature:#?}",
            created.address, created.distributor
        ),
        None => println!(
            "airdrop {} already on-chain at {}, parameters match",
            created.address, created.distributor
        ),
    }
    Ok(())
}
