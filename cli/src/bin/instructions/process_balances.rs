use crate::*;

pub async fn process_balances(args: &Args, balances_args: &BalancesArgs) -> Result<()> {
    let wallet = args.wallet(&balances_args.address)?;
    let dashboard = args.dashboard();
    let balances = dashboard.balances(&wallet).await?;

    println!("balances for {}", wallet);
    println!("SOL: {}", balances.sol);
    for token in &balances.tokens {
        println!("{} ({}): {}", token.name, token.symbol, token.amount);
    }
    Ok(())
}
