use crate::*;

use airdrop_client::math::{format_token_amount, format_usd};

pub async fn process_show(args: &Args, show_args: &ShowArgs) -> Result<()> {
    let dashboard = args.dashboard();
    let detail = dashboard.airdrop_detail(&show_args.airdrop).await?;

    println!("{} [{}]", detail.airdrop.name, detail.kind);
    println!("token: {} ({})", detail.token.name, detail.token.symbol);
    println!("sender: {}", detail.airdrop.sender);
    println!("recipients: {}", detail.airdrop.max_num_nodes);
    println!(
        "pool: {} {}",
        format_token_amount(detail.airdrop.max_total_claim, detail.token.decimals),
        detail.token.symbol
    );
    match detail.total_value_usd() {
        Some(value) => println!("pool value: {}", format_usd(value)),
        None => println!("pool value: no price available"),
    }
    println!(
        "claimed: {} {} ({:.1}%)",
        format_token_amount(detail.amount_claimed, detail.token.decimals),
        detail.token.symbol,
        detail.progress
    );
    if let Some(progress) = detail.vesting_progress(unix_ts()) {
        println!("vesting: {progress:.1}% elapsed");
    }
    if detail.onchain.is_none() {
        println!("not yet on-chain");
    }
    Ok(())
}
