use crate::*;

pub async fn process_claim(args: &Args, claim_args: &ClaimArgs) -> Result<()> {
    let keypair = args.keypair()?;
    println!("Claiming tokens for user {}...", keypair.pubkey());

    let dashboard = args.dashboard();
    let signature = dashboard.claim(&claim_args.airdrop, &keypair).await?;
    println!("successfully claimed tokens with signature {signature:#?}");
    Ok(())
}
