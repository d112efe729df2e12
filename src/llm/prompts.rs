//! Prompt template for contract summaries

use serde::{Deserialize, Serialize};

/// Heading the model must open its answer with.
pub const SUMMARY_HEADING: &str = "## Contract Summary";

const PLACEHOLDER: &str = "{contract_input}";

/// Summary prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub contract_summary: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            contract_summary: CONTRACT_SUMMARY_TEMPLATE.to_string(),
        }
    }
}

/// Parameters for prompt template substitution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptParams {
    pub contract_input: String,
}

impl PromptTemplates {
    pub fn render_contract_summary(&self, params: &PromptParams) -> String {
        log::debug!("Rendering summary prompt with {} bytes of input", params.contract_input.len());
        self.contract_summary.replace(PLACEHOLDER, &params.contract_input)
    }
}

/// Whether model output follows the section layout the prompt asks for.
pub fn follows_summary_format(output: &str) -> bool {
    output.contains(SUMMARY_HEADING)
}

const CONTRACT_SUMMARY_TEMPLATE: &str = r#"You are an expert Solidity developer. Analyze the following smart contract input (either ABI or Solidity code) and provide a plain-English technical summary.

**Input**:
{contract_input}

**Instructions**:
- Summarize the contract's purpose and functionality.
- Identify key functions and their roles.
- Describe permissions and access control (e.g., who can call what).
- Highlight security patterns or potential risks (e.g., use of modifiers, reentrancy protection).
- If the input is invalid or unclear, return an error message.

**Output Format**:
```markdown
## Contract Summary
[Purpose and functionality]

## Key Functions
- [Function name]: [Description and role]

## Permissions
- [Who can call what, e.g., owner-only functions]

## Security Patterns
- [Security measures or risks, e.g., use of OpenZeppelin, checks-effects-interactions]
```

**Example Input** (Solidity):
```solidity
// SPDX-License-Identifier: MIT
pragma solidity ^0.8.0;

import "@openzeppelin/contracts/token/ERC20/ERC20.sol";
import "@openzeppelin/contracts/access/Ownable.sol";

contract AllowlistToken is ERC20, Ownable {
    mapping(address => bool) private _allowlist;

    constructor(string memory name, string memory symbol) ERC20(name, symbol) Ownable(msg.sender) {}

    modifier onlyAllowlisted() {
        require(_allowlist[msg.sender], "Not allowlisted");
        _;
    }

    function mint(address to, uint256 amount) external onlyAllowlisted {
        _mint(to, amount);
    }

    function addToAllowlist(address account) external onlyOwner {
        _allowlist[account] = true;
    }
}
```

**Example Output**:
```markdown
## Contract Summary
This is an ERC-20 token contract with minting restricted to addresses in an allowlist, managed by the contract owner.

## Key Functions
- mint(address to, uint256 amount): Mints tokens to a specified address, callable only by allowlisted addresses.
- addToAllowlist(address account): Adds an address to the allowlist, callable only by the owner.

## Permissions
- Only allowlisted addresses can call the mint function.
- Only the contract owner can call addToAllowlist to manage the allowlist.

## Security Patterns
- Uses OpenZeppelin's ERC-20 and Ownable for audited, secure implementations.
- Employs a modifier (onlyAllowlisted) to restrict minting.
- Solidity ^0.8.0 prevents overflow/underflow.
- No reentrancy guards needed as minting does not call external contracts.
```
"#;
