use crate::*;

use airdrop_client::math::format_token_amount;

pub async fn process_claimable(args: &Args, claimable_args: &ClaimableArgs) -> Result<()> {
    let wallet = args.wallet(&claimable_args.address)?;
    let dashboard = args.dashboard();
    let entries = dashboard.claimable(&wallet).await?;

    if entries.is_empty() {
        println!("nothing to claim for {}", wallet);
        return Ok(());
    }
    println!("{} claimable airdrops for {}", entries.len(), wallet);
    for entry in &entries {
        let allocation = entry
            .claimant
            .amount_unlocked
            .saturating_add(entry.claimant.amount_locked);
        match &entry.airdrop {
            Some(airdrop) => {
                let token = dashboard.token_metadata(&airdrop.mint).await;
                println!(
                    "{}: {} {} (distributor {})",
                    airdrop.name,
                    format_token_amount(allocation, token.decimals),
                    token.symbol,
                    entry.claimant.distributor_address
                );
            }
            None => println!(
                "{}: {} base units",
                entry.claimant.distributor_address, allocation
            ),
        }
    }
    Ok(())
}
