use crate::*;

pub async fn process_list(args: &Args, list_args: &ListArgs) -> Result<()> {
    let dashboard = args.dashboard();
    let page = dashboard.airdrops(list_args.limit, list_args.offset).await?;

    println!(
        "{} airdrops (limit {}, offset {})",
        page.items.len(),
        page.limit,
        page.offset
    );
    for airdrop in &page.items {
        println!(
            "{} [{}] distributor {} mint {} recipients {} claimed {:.1}%",
            airdrop.name,
            airdrop.kind(),
            airdrop.address,
            airdrop.mint,
            airdrop.max_num_nodes,
            airdrop.claim_progress()
        );
    }
    Ok(())
}
