use crate::*;

use airdrop_client::{eligibility::Eligibility, math::format_token_amount};

pub async fn process_eligibility(args: &Args, eligibility_args: &EligibilityArgs) -> Result<()> {
    let wallet = args.wallet(&eligibility_args.address)?;
    let dashboard = args.dashboard();
    let detail = dashboard.airdrop_detail(&eligibility_args.airdrop).await?;
    let eligibility = dashboard
        .eligibility(&eligibility_args.airdrop, &wallet)
        .await?;

    let decimals = detail.token.decimals;
    let symbol = &detail.token.symbol;
    println!("{} in {}:", wallet, detail.airdrop.name);
    match eligibility {
        Eligibility::NotEligible => {
            println!("not eligible");
        }
        Eligibility::Eligible {
            amount_unlocked,
            amount_locked,
            amount_claimable,
        } => {
            println!("eligible, nothing claimed yet");
            println!(
                "unlocked allocation: {} {}",
                format_token_amount(amount_unlocked, decimals),
                symbol
            );
            println!(
                "locked allocation: {} {}",
                format_token_amount(amount_locked, decimals),
                symbol
            );
            println!(
                "claimable now: {} {}",
                format_token_amount(amount_claimable, decimals),
                symbol
            );
        }
        Eligibility::Claimed {
            amount_withdrawn,
            amount_claimable,
            last_claim_ts,
        } => {
            println!("claimed, last claim at {}", last_claim_ts);
            println!(
                "withdrawn: {} {}",
                format_token_amount(amount_withdrawn, decimals),
                symbol
            );
            println!(
                "claimable now: {} {}",
                format_token_amount(amount_claimable, decimals),
                symbol
            );
        }
        Eligibility::Expired {
            amount_unlocked,
            amount_locked,
            amount_withdrawn,
        } => {
            println!("expired, distributor was clawed back");
            println!(
                "allocation: {} {}",
                format_token_amount(amount_unlocked.saturating_add(amount_locked), decimals),
                symbol
            );
            println!(
                "withdrawn: {} {}",
                format_token_amount(amount_withdrawn, decimals),
                symbol
            );
        }
    }
    Ok(())
}
