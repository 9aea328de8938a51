mod inventory_flow;
mod survey_flow;
